//! Blocking HTTP client for the Reddit JSON listing API.

use crate::config::{ClientConfig, TimeFilter};
use crate::models::{CommentNode, Listing, Post};
use crate::source::{ListingSource, PostStream};
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;

pub struct RedditClient {
    http: Client,
    base_url: String,
    subreddit: String,
    page_size: usize,
    comment_limit: usize,
    json_suffix: &'static str, // public host serves JSON under `.json` paths
}

impl RedditClient {
    pub fn new(cfg: &ClientConfig, subreddit: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&cfg.user_agent).context("user agent is not a valid header value")?,
        );
        if let Some(token) = &cfg.access_token {
            let mut v = HeaderValue::from_str(&format!("bearer {token}"))
                .context("access token is not a valid header value")?;
            v.set_sensitive(true);
            headers.insert(AUTHORIZATION, v);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(None::<std::time::Duration>)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            http,
            base_url: cfg.resolved_base_url(),
            subreddit: subreddit.into(),
            page_size: cfg.page_size,
            comment_limit: cfg.comment_limit,
            json_suffix: if cfg.access_token.is_some() { "" } else { ".json" },
        })
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// One page of the top listing. Returns the posts and the cursor for the next page.
    pub fn fetch_top_page(&self, time_filter: TimeFilter, after: Option<&str>) -> Result<(Vec<Post>, Option<String>)> {
        let url = format!("{}/r/{}/top{}", self.base_url, self.subreddit, self.json_suffix);
        let limit = self.page_size.to_string();
        let mut query: Vec<(&str, &str)> = vec![("t", time_filter.as_str()), ("limit", limit.as_str()), ("raw_json", "1")];
        if let Some(a) = after {
            query.push(("after", a));
        }
        tracing::debug!(%url, after = after.unwrap_or(""), "fetching top page");
        let listing: Listing = self.get_json(&url, &query)?;
        listing.into_posts().with_context(|| format!("decoding top listing of r/{}", self.subreddit))
    }

    pub fn fetch_comments(&self, post_id: &str) -> Result<Vec<CommentNode>> {
        let url = format!("{}/comments/{}{}", self.base_url, post_id, self.json_suffix);
        let limit = self.comment_limit.to_string();
        let query = [("limit", limit.as_str()), ("depth", "1"), ("raw_json", "1")];
        tracing::debug!(%url, "fetching comments");

        // [post listing, comment listing]
        let listings: Vec<Listing> = self.get_json(&url, &query)?;
        let comments = listings
            .into_iter()
            .nth(1)
            .ok_or_else(|| anyhow!("comment response for {post_id} has no comment listing"))?;
        comments.into_comment_nodes().with_context(|| format!("decoding comments of {post_id}"))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .with_context(|| format!("GET {url}"))?;
        let resp = resp.error_for_status().with_context(|| format!("GET {url}"))?;
        resp.json::<T>().with_context(|| format!("parsing JSON from {url}"))
    }
}

impl ListingSource for RedditClient {
    fn top_posts(&self, time_filter: TimeFilter) -> PostStream<'_> {
        Box::new(TopPosts { client: self, time_filter, buf: VecDeque::new(), after: None, exhausted: false })
    }

    fn comments(&self, post_id: &str) -> Result<Vec<CommentNode>> {
        self.fetch_comments(post_id)
    }
}

/// Follows the `after` cursor page by page; stops on an empty page or a missing cursor.
struct TopPosts<'a> {
    client: &'a RedditClient,
    time_filter: TimeFilter,
    buf: VecDeque<Post>,
    after: Option<String>,
    exhausted: bool,
}

impl Iterator for TopPosts<'_> {
    type Item = Result<Post>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(p) = self.buf.pop_front() {
                return Some(Ok(p));
            }
            if self.exhausted {
                return None;
            }
            match self.client.fetch_top_page(self.time_filter, self.after.as_deref()) {
                Ok((posts, after)) => {
                    self.exhausted = posts.is_empty() || after.is_none();
                    self.after = after;
                    self.buf.extend(posts);
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
