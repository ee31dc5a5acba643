//! Flattening: posts and ranked comments into three string tables.
//! The combined table left-joins each rank's comment onto its post as `comment{r}_*` columns.

use crate::date::epoch_to_rfc3339;
use crate::models::{Post, RankedComment};
use anyhow::Result;
use std::collections::HashMap;

pub const POST_COLUMNS: [&str; 8] =
    ["post_id", "title", "score", "url", "num_comments", "created_utc", "author", "selftext"];

pub const COMMENT_COLUMNS: [&str; 6] =
    ["post_id", "comment_id", "comment_body", "comment_score", "comment_author", "comment_rank"];

/// Comment columns carried into the combined table (join key and rank dropped).
const JOINED_COMMENT_COLUMNS: [&str; 4] = ["comment_id", "comment_body", "comment_score", "comment_author"];

/// Column-ordered table of string cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { headers: headers.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// First `n` rows under the same headers.
    pub fn head(&self, n: usize) -> Table {
        Table { headers: self.headers.clone(), rows: self.rows.iter().take(n).cloned().collect() }
    }

    fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }
}

/// The three tables one run produces.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrapeTables {
    pub posts: Table,
    pub comments: Table,
    pub combined: Table,
}

impl ScrapeTables {
    pub fn build(posts: &[Post], comments: &[RankedComment], top_n: usize) -> Result<Self> {
        let posts_t = posts_table(posts)?;
        let comments_t = comments_table(comments);
        let combined = combined_table(&posts_t, comments, top_n);
        Ok(Self { posts: posts_t, comments: comments_t, combined })
    }
}

pub fn posts_table(posts: &[Post]) -> Result<Table> {
    let mut t = Table::new(POST_COLUMNS);
    for p in posts {
        t.push_row(vec![
            p.post_id.clone(),
            p.title.clone(),
            p.score.to_string(),
            p.url.clone(),
            p.num_comments.to_string(),
            epoch_to_rfc3339(p.created_utc)?,
            p.author.clone(),
            p.selftext.clone(),
        ]);
    }
    Ok(t)
}

pub fn comments_table(comments: &[RankedComment]) -> Table {
    let mut t = Table::new(COMMENT_COLUMNS);
    for c in comments {
        t.push_row(vec![
            c.post_id.clone(),
            c.comment_id.clone(),
            c.comment_body.clone(),
            c.comment_score.to_string(),
            c.comment_author.clone(),
            c.comment_rank.to_string(),
        ]);
    }
    t
}

/// One row per post: the post's columns, then for each rank `r` in `1..=top_n`
/// the `comment{r}_*` columns, empty when that rank is missing.
pub fn combined_table(posts: &Table, comments: &[RankedComment], top_n: usize) -> Table {
    let mut headers = posts.headers.clone();
    for r in 1..=top_n {
        headers.extend(JOINED_COMMENT_COLUMNS.iter().map(|c| format!("comment{r}_{c}")));
    }
    let mut t = Table::new(headers);

    let by_key: HashMap<(&str, usize), &RankedComment> =
        comments.iter().map(|c| ((c.post_id.as_str(), c.comment_rank), c)).collect();

    let key_idx = posts.column_index("post_id").unwrap_or(0);
    for row in &posts.rows {
        let post_id = row[key_idx].as_str();
        let mut out = row.clone();
        for r in 1..=top_n {
            match by_key.get(&(post_id, r)) {
                Some(c) => out.extend([
                    c.comment_id.clone(),
                    c.comment_body.clone(),
                    c.comment_score.to_string(),
                    c.comment_author.clone(),
                ]),
                None => out.extend(std::iter::repeat(String::new()).take(JOINED_COMMENT_COLUMNS.len())),
            }
        }
        t.push_row(out);
    }
    t
}
