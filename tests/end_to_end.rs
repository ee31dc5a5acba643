#[path = "common/mod.rs"]
mod common;

use common::*;
use rtop::{normalize_subreddit, DateWindow, ManualClock, ScrapeOptions, SubredditScraper, MAX_TOP_COMMENTS};
use std::time::Duration;

/// Full run over an in-memory listing with a virtual clock:
/// - 4 listing posts, one outside the window; target 3
/// - rate limit of 2 calls per 10 s
/// - p1 has 4 comments and a stub, p2 has 2, p3 has none
/// Expectation: 3 kept posts, 6 limiter calls (3 posts + 3 expansions), 20 s of virtual sleep,
/// three CSVs named `test_*_Dating.csv` (caller's casing), and a combined table with the left-join gaps.
#[test]
fn run_with_fake_source_writes_all_tables() {
    let tmp = tempfile::tempdir().unwrap();
    let src = FakeSource::with_pages(vec![
        vec![post("p1", JAN_2022 + DAY, 900), post("old", JAN_2022 - DAY, 800)],
        vec![post("p2", JAN_2022 + 2 * DAY, 700), post("p3", JAN_2022 + 3 * DAY, 600)],
        vec![post("p4", JAN_2022 + 4 * DAY, 500)],
    ])
    .with_comments("p1", vec![comment("a", 5), comment("b", 3), more(10), comment("c", 8), comment("d", 1)])
    .with_comments("p2", vec![comment("e", 2), comment("f", 9)]);

    let clock = ManualClock::new();
    let report = SubredditScraper::new()
        .subreddit("r/Dating")
        .window(DateWindow::new(JAN_2022, DEC_31_2024).unwrap())
        .num_posts(3)
        .rate_limit(2, Duration::from_secs(10))
        .test_mode(true)
        .out_dir(tmp.path())
        .progress(false)
        .run_with(&src, clock.clone())
        .unwrap();

    assert_eq!(report.posts_scraped(), 3);
    assert_eq!(report.total_calls, 6);
    assert_eq!(clock.total_slept(), Duration::from_secs(20));
    assert_eq!(src.page_fetches.get(), 2, "third page must not be fetched");

    let names: Vec<_> = report.files.iter().map(|f| f.file_name().unwrap().to_string_lossy().into_owned()).collect();
    assert_eq!(names, ["test_posts_Dating.csv", "test_comments_Dating.csv", "test_combined_Dating.csv"]);

    let (_, comment_rows) = read_csv(&report.files[1]);
    let ranks: Vec<_> = comment_rows.iter().map(|r| (r[0].as_str(), r[3].as_str(), r[5].as_str())).collect();
    assert_eq!(ranks, [("p1", "8", "1"), ("p1", "5", "2"), ("p1", "3", "3"), ("p2", "9", "1"), ("p2", "2", "2")]);

    let combined = &report.tables.combined;
    assert_eq!(combined.column("post_id").unwrap(), ["p1", "p2", "p3"]);
    assert_eq!(combined.cell(0, "comment3_comment_score"), Some("3"));
    assert_eq!(combined.cell(1, "comment3_comment_id"), Some(""));
    assert_eq!(combined.cell(2, "comment1_comment_id"), Some(""));

    let (headers, rows) = read_csv(&report.files[2]);
    assert_eq!(headers, combined.headers);
    assert_eq!(rows, combined.rows);
}

/// Invalid subreddit names fail before any request is made.
#[test]
fn invalid_subreddit_fails_fast() {
    let tmp = tempfile::tempdir().unwrap();
    let src = FakeSource::with_pages(vec![vec![post("p1", JAN_2022, 1)]]);

    let err = SubredditScraper::new()
        .subreddit("no spaces allowed")
        .out_dir(tmp.path())
        .progress(false)
        .run_with(&src, ManualClock::new())
        .unwrap_err();

    assert!(err.to_string().contains("invalid subreddit"));
    assert_eq!(src.page_fetches.get(), 0);
    assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none(), "no files should be written");
}

/// Prefixes and slashes are stripped, casing is kept, and names are matched case-insensitively.
#[test]
fn subreddit_names_are_normalized_without_lowercasing() {
    let opts = ScrapeOptions::default().with_subreddit(" /r/AskReddit/ ");
    assert_eq!(opts.validated_subreddit().unwrap(), "AskReddit");
    assert_eq!(normalize_subreddit("r/Dating"), "Dating");
    assert!(ScrapeOptions::default().with_subreddit("Bad-Name").validated_subreddit().is_err());
}

/// Ranks per post are bounded on both sides.
#[test]
fn top_comments_is_clamped() {
    assert_eq!(ScrapeOptions::default().with_top_comments(usize::MAX).top_comments, MAX_TOP_COMMENTS);
    assert_eq!(ScrapeOptions::default().with_top_comments(0).top_comments, 1);
}

/// A missing subreddit is an error, too.
#[test]
fn missing_subreddit_is_an_error() {
    let src = FakeSource::default();
    let err = SubredditScraper::new().progress(false).run_with(&src, ManualClock::new()).unwrap_err();
    assert!(err.to_string().contains("subreddit is required"));
}

/// A listing failure mid-run aborts everything; no CSVs are written.
#[test]
fn listing_failure_aborts_without_output() {
    let tmp = tempfile::tempdir().unwrap();
    let mut src = FakeSource::with_pages(vec![vec![post("p1", JAN_2022 + DAY, 1)], vec![post("p2", JAN_2022 + DAY, 1)]]);
    src.fail_on_page = Some(1);

    let res = SubredditScraper::new()
        .subreddit("dating")
        .window(DateWindow::new(JAN_2022, DEC_31_2024).unwrap())
        .num_posts(5)
        .out_dir(tmp.path())
        .progress(false)
        .run_with(&src, ManualClock::new());

    assert!(res.is_err());
    assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());
}
