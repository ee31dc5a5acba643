use crate::date::DateWindow;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "rtop/0.1 (top posts and comments exporter)";
pub const PUBLIC_BASE_URL: &str = "https://www.reddit.com";
pub const OAUTH_BASE_URL: &str = "https://oauth.reddit.com";
/// Upper bound on ranks kept per post; each rank adds a column group to the combined table.
pub const MAX_TOP_COMMENTS: usize = 100;

/// Ranking period for the top listing (`t=` query parameter).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeFilter {
    Hour,
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl TimeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for the listing provider, injected into the client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Option<String>,     // None: pick public or OAuth host from `access_token`
    pub user_agent: String,
    pub access_token: Option<String>, // pre-issued bearer token; no token exchange is done here
    pub page_size: usize,             // listing `limit`, provider caps at 100
    pub comment_limit: usize,         // top-level comments requested per post
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            access_token: None,
            page_size: 100,
            comment_limit: 500,
        }
    }
}

impl ClientConfig {
    /// Read overrides from the environment:
    /// - REDDIT_USER_AGENT
    /// - REDDIT_ACCESS_TOKEN
    /// - REDDIT_BASE_URL
    /// - REDDIT_PAGE_SIZE
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(ua) = non_empty_env("REDDIT_USER_AGENT") {
            cfg.user_agent = ua;
        }
        if let Some(token) = non_empty_env("REDDIT_ACCESS_TOKEN") {
            cfg.access_token = Some(token);
        }
        if let Some(url) = non_empty_env("REDDIT_BASE_URL") {
            cfg.base_url = Some(url);
        }
        if let Some(n) = non_empty_env("REDDIT_PAGE_SIZE") {
            let n: usize = n.parse().with_context(|| format!("REDDIT_PAGE_SIZE is not a number: {n}"))?;
            cfg = cfg.with_page_size(n);
        }
        Ok(cfg)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = n.clamp(1, 100);
        self
    }
    pub fn with_comment_limit(mut self, n: usize) -> Self {
        self.comment_limit = n.max(1);
        self
    }

    pub fn resolved_base_url(&self) -> String {
        let base = match (&self.base_url, &self.access_token) {
            (Some(url), _) => url.as_str(),
            (None, Some(_)) => OAUTH_BASE_URL,
            (None, None) => PUBLIC_BASE_URL,
        };
        base.trim_end_matches('/').to_string()
    }
}

/// What to scrape and where to put it.
#[derive(Clone, Debug)]
pub struct ScrapeOptions {
    pub subreddit: Option<String>, // caller's casing, no "r/"
    pub window: DateWindow,
    pub num_posts: usize,
    pub time_filter: TimeFilter,
    pub top_comments: usize,       // ranks kept per post
    pub test_mode: bool,           // prefixes output files with `test_`
    pub out_dir: PathBuf,

    // rate limiting
    pub max_calls: usize,
    pub period: Duration,

    pub progress: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            subreddit: None,
            window: DateWindow::unbounded(),
            num_posts: 100,
            time_filter: TimeFilter::All,
            top_comments: 3,
            test_mode: false,
            out_dir: PathBuf::from("."),
            max_calls: 60,
            period: Duration::from_secs(60),
            progress: true,
        }
    }
}

impl ScrapeOptions {
    pub fn with_subreddit(mut self, sub: impl AsRef<str>) -> Self {
        self.subreddit = Some(normalize_subreddit(sub.as_ref()));
        self
    }
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }
    pub fn with_num_posts(mut self, n: usize) -> Self {
        self.num_posts = n;
        self
    }
    pub fn with_time_filter(mut self, tf: TimeFilter) -> Self {
        self.time_filter = tf;
        self
    }
    pub fn with_top_comments(mut self, n: usize) -> Self {
        self.top_comments = n.clamp(1, MAX_TOP_COMMENTS);
        self
    }
    pub fn with_test_mode(mut self, yes: bool) -> Self {
        self.test_mode = yes;
        self
    }
    pub fn with_out_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.out_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_rate_limit(mut self, max_calls: usize, period: Duration) -> Self {
        self.max_calls = max_calls.max(1);
        self.period = period;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    /// The subreddit as given (used in file names), checked against the provider's naming rules.
    pub fn validated_subreddit(&self) -> Result<&str> {
        let Some(sub) = self.subreddit.as_deref() else {
            bail!("subreddit is required");
        };
        if !subreddit_pattern().is_match(sub) {
            bail!("invalid subreddit name: {sub:?}");
        }
        Ok(sub)
    }
}

#[inline]
pub fn normalize_subreddit(s: &str) -> String {
    let s = s.trim();
    let s = s.strip_prefix('/').unwrap_or(s);
    s.strip_prefix("r/").unwrap_or(s).trim_end_matches('/').to_string()
}

fn subreddit_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[a-z0-9][a-z0-9_]{1,20}$").expect("static regex"))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
