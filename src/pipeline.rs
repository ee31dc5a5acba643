use crate::client::RedditClient;
use crate::config::{ClientConfig, ScrapeOptions, TimeFilter};
use crate::date::DateWindow;
use crate::export::export_tables;
use crate::models::{Post, RankedComment};
use crate::progress::ProgressScope;
use crate::rate_limiter::{Clock, RateLimiter, SystemClock};
use crate::ranking::rank_top_comments;
use crate::source::ListingSource;
use crate::tables::ScrapeTables;
use crate::util::init_tracing_once;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pull posts from the top listing, keeping those created inside `window`,
/// until `target` are collected or the listing runs out.
///
/// Each kept post costs one limiter token; skipped posts and page fetches cost none.
pub fn collect_posts<S, C>(
    source: &S,
    window: DateWindow,
    target: usize,
    time_filter: TimeFilter,
    limiter: &mut RateLimiter<C>,
    progress: &ProgressScope,
) -> Result<Vec<Post>>
where
    S: ListingSource + ?Sized,
    C: Clock,
{
    let mut posts = Vec::with_capacity(target.min(1024));
    if target == 0 {
        return Ok(posts);
    }

    let mut seen: u64 = 0;
    for item in source.top_posts(time_filter) {
        let post = item.context("reading top listing")?;
        seen += 1;
        if !window.contains(post.created_utc) {
            continue;
        }
        limiter.call();
        posts.push(post);
        progress.inc_items(1);
        if posts.len() >= target {
            break;
        }
    }

    if posts.len() < target {
        tracing::warn!(wanted = target, got = posts.len(), seen, "listing exhausted before target count");
    } else {
        tracing::debug!(seen, kept = posts.len(), "target count reached");
    }
    Ok(posts)
}

/// Expand and rank comments for every post, one limiter token per post.
pub fn fetch_ranked_comments<S, C>(
    source: &S,
    posts: &[Post],
    top_n: usize,
    limiter: &mut RateLimiter<C>,
    progress: &ProgressScope,
) -> Result<Vec<RankedComment>>
where
    S: ListingSource + ?Sized,
    C: Clock,
{
    let mut out = Vec::with_capacity(posts.len().saturating_mul(top_n).min(4096));
    for post in posts {
        limiter.call();
        let nodes = source
            .comments(&post.post_id)
            .with_context(|| format!("fetching comments for post {}", post.post_id))?;
        let ranked = rank_top_comments(&post.post_id, &nodes, top_n);
        tracing::debug!(post_id = %post.post_id, fetched = nodes.len(), kept = ranked.len(), "ranked comments");
        out.extend(ranked);
        progress.inc_items(1);
    }
    Ok(out)
}

/// Outcome of a finished run.
#[derive(Clone, Debug)]
pub struct ScrapeReport {
    pub tables: ScrapeTables,
    pub files: Vec<PathBuf>,
    pub total_calls: u64,
}

impl ScrapeReport {
    pub fn posts_scraped(&self) -> usize {
        self.tables.posts.len()
    }
}

#[derive(Clone)]
pub struct SubredditScraper {
    pub(crate) opts: ScrapeOptions,
    pub(crate) client: ClientConfig,
}

impl Default for SubredditScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl SubredditScraper {
    pub fn new() -> Self {
        Self { opts: ScrapeOptions::default(), client: ClientConfig::default() }
    }

    // -------- Builder methods --------
    pub fn client_config(mut self, cfg: ClientConfig) -> Self { self.client = cfg; self }
    pub fn subreddit(mut self, sub: impl AsRef<str>) -> Self { self.opts = self.opts.with_subreddit(sub); self }
    pub fn window(mut self, window: DateWindow) -> Self { self.opts = self.opts.with_window(window); self }
    pub fn num_posts(mut self, n: usize) -> Self { self.opts = self.opts.with_num_posts(n); self }
    pub fn time_filter(mut self, tf: TimeFilter) -> Self { self.opts = self.opts.with_time_filter(tf); self }
    pub fn top_comments(mut self, n: usize) -> Self { self.opts = self.opts.with_top_comments(n); self }
    pub fn test_mode(mut self, yes: bool) -> Self { self.opts = self.opts.with_test_mode(yes); self }
    pub fn out_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_out_dir(dir); self }
    pub fn rate_limit(mut self, max_calls: usize, period: Duration) -> Self { self.opts = self.opts.with_rate_limit(max_calls, period); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }

    pub fn options(&self) -> &ScrapeOptions {
        &self.opts
    }

    /// Full run against the HTTP provider with the wall clock.
    pub fn run(self) -> Result<ScrapeReport> {
        // Listing paths are case-insensitive; requests always use the lowercase form.
        let subreddit = self.opts.validated_subreddit()?.to_lowercase();
        let client = RedditClient::new(&self.client, subreddit)?;
        self.run_with(&client, SystemClock)
    }

    /// Full run against any listing source and clock.
    pub fn run_with<S, C>(&self, source: &S, clock: C) -> Result<ScrapeReport>
    where
        S: ListingSource + ?Sized,
        C: Clock,
    {
        init_tracing_once();
        let subreddit = self.opts.validated_subreddit()?;
        let opts = &self.opts;
        tracing::info!(
            subreddit, window = %opts.window, target = opts.num_posts,
            max_calls = opts.max_calls, period_s = opts.period.as_secs_f64(),
            "starting scrape"
        );

        let mut limiter = RateLimiter::with_clock(opts.max_calls, opts.period, clock);

        let pb = ProgressScope::when(opts.progress, "Fetching posts", opts.num_posts as u64);
        let posts = collect_posts(source, opts.window, opts.num_posts, opts.time_filter, &mut limiter, &pb)?;
        pb.finish(format!("{} posts", posts.len()));

        let pb = ProgressScope::when(opts.progress, "Processing posts and fetching comments", posts.len() as u64);
        let comments = fetch_ranked_comments(source, &posts, opts.top_comments, &mut limiter, &pb)?;
        pb.finish(format!("{} comments", comments.len()));

        let tables = ScrapeTables::build(&posts, &comments, opts.top_comments)?;
        let files = export_tables(&tables, &opts.out_dir, subreddit, opts.test_mode)?;

        let total_calls = limiter.total_calls();
        tracing::info!(posts = tables.posts.len(), comments = tables.comments.len(), total_calls, "scrape finished");
        Ok(ScrapeReport { tables, files, total_calls })
    }
}
