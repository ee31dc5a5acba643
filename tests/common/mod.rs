#![allow(dead_code)]

use anyhow::{anyhow, Result};
use rtop::{Comment, CommentNode, ListingSource, Post, PostStream, TimeFilter};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 2022-01-01T00:00:00Z and 2024-12-31T00:00:00Z.
pub const JAN_2022: i64 = 1_640_995_200;
pub const DEC_31_2024: i64 = 1_735_603_200;
pub const DAY: i64 = 86_400;

pub fn post(id: &str, created_utc: i64, score: i64) -> Post {
    Post {
        post_id: id.to_string(),
        title: format!("title {id}"),
        score,
        url: format!("https://www.reddit.com/r/dating/comments/{id}/"),
        num_comments: 4,
        created_utc,
        author: format!("author_{id}"),
        selftext: format!("body of {id}"),
    }
}

pub fn comment(id: &str, score: i64) -> CommentNode {
    CommentNode::Comment(Comment {
        comment_id: id.to_string(),
        body: format!("comment {id}"),
        score,
        author: format!("user_{id}"),
    })
}

pub fn more(count: u64) -> CommentNode {
    CommentNode::More { count }
}

/// In-memory listing provider. Pages are handed out lazily and counted,
/// so tests can see how far the pipeline pulled the listing.
#[derive(Default)]
pub struct FakeSource {
    pub pages: Vec<Vec<Post>>,
    pub comments: HashMap<String, Vec<CommentNode>>,
    /// Fail when this page index is requested.
    pub fail_on_page: Option<usize>,
    /// Fail when comments for this post are requested.
    pub fail_comments_for: Option<String>,
    pub page_fetches: Cell<usize>,
    pub comment_requests: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn with_pages(pages: Vec<Vec<Post>>) -> Self {
        Self { pages, ..Default::default() }
    }

    pub fn with_comments(mut self, post_id: &str, nodes: Vec<CommentNode>) -> Self {
        self.comments.insert(post_id.to_string(), nodes);
        self
    }
}

impl ListingSource for FakeSource {
    fn top_posts(&self, _time_filter: TimeFilter) -> PostStream<'_> {
        let mut page = 0usize;
        let mut buf: std::vec::IntoIter<Post> = Vec::new().into_iter();
        Box::new(std::iter::from_fn(move || loop {
            if let Some(p) = buf.next() {
                return Some(Ok(p));
            }
            if page >= self.pages.len() {
                return None;
            }
            self.page_fetches.set(self.page_fetches.get() + 1);
            if self.fail_on_page == Some(page) {
                page = self.pages.len();
                return Some(Err(anyhow!("HTTP 503 on page {}", self.page_fetches.get())));
            }
            buf = self.pages[page].clone().into_iter();
            page += 1;
        }))
    }

    fn comments(&self, post_id: &str) -> Result<Vec<CommentNode>> {
        self.comment_requests.borrow_mut().push(post_id.to_string());
        if self.fail_comments_for.as_deref() == Some(post_id) {
            return Err(anyhow!("HTTP 429 for {post_id}"));
        }
        Ok(self.comments.get(post_id).cloned().unwrap_or_default())
    }
}

/// Read a CSV file into (headers, rows).
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path).unwrap();
    let headers = rdr.headers().unwrap().iter().map(str::to_string).collect();
    let rows = rdr
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}

pub fn read_text(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
