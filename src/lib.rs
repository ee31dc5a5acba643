mod config;
mod date;
mod models;
mod rate_limiter;

mod client;
mod source;
mod ranking;
mod pipeline;

mod tables;
mod export;
mod progress;
mod util;

pub use crate::config::{normalize_subreddit, ClientConfig, ScrapeOptions, TimeFilter, MAX_TOP_COMMENTS};
pub use crate::date::{epoch_to_rfc3339, midnight_utc, DateWindow};
pub use crate::models::{Comment, CommentNode, Post, RankedComment};
pub use crate::rate_limiter::{Clock, ManualClock, RateLimiter, SystemClock, MAX_PERIOD};

// Provider seam and the HTTP implementation.
pub use crate::client::RedditClient;
pub use crate::source::{ListingSource, PostStream};

// Pipeline stages, usable one by one or through the scraper.
pub use crate::pipeline::{collect_posts, fetch_ranked_comments, ScrapeReport, SubredditScraper};
pub use crate::ranking::rank_top_comments;
pub use crate::tables::{combined_table, comments_table, posts_table, ScrapeTables, Table, COMMENT_COLUMNS, POST_COLUMNS};
pub use crate::export::{export_tables, output_file_name, write_table_csv, TableKind};

pub use crate::progress::ProgressScope;
pub use crate::util::init_tracing_once;
