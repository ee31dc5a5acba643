use anyhow::Result;
use rtop::{ClientConfig, DateWindow, SubredditScraper, Table};
use time::macros::date;

const SUBREDDIT: &str = "dating";
const NUM_POSTS: usize = 300;
const TEST_MODE: bool = false;
const OUT_DIR: &str = ".";

fn main() -> Result<()> {
    // Credentials and overrides come from the environment (or a local .env).
    let _ = dotenvy::dotenv();
    let client = ClientConfig::from_env()?;

    let window = DateWindow::from_dates(date!(2022 - 01 - 01), date!(2024 - 12 - 31))?;

    let report = SubredditScraper::new()
        .client_config(client)
        .subreddit(SUBREDDIT)
        .window(window)
        .num_posts(NUM_POSTS)
        .test_mode(TEST_MODE)
        .out_dir(OUT_DIR)
        .progress(true)
        .run()?;

    println!("Scraped {} posts and their top comments and saved to CSVs.", report.posts_scraped());
    println!("Total API calls made (tracked internally): {}", report.total_calls);

    println!("\nSample of combined data:");
    print_preview(&report.tables.combined.head(5));
    Ok(())
}

fn print_preview(t: &Table) {
    const WIDTH: usize = 24;
    let clip = |s: &str| -> String {
        let one_line = s.replace(['\n', '\r'], " ");
        if one_line.chars().count() > WIDTH {
            format!("{}…", one_line.chars().take(WIDTH - 1).collect::<String>())
        } else {
            one_line
        }
    };
    println!("{}", t.headers.iter().map(|h| clip(h.as_str())).collect::<Vec<_>>().join(" | "));
    for row in &t.rows {
        println!("{}", row.iter().map(|c| clip(c.as_str())).collect::<Vec<_>>().join(" | "));
    }
}
