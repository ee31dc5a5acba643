//! Post and comment records, plus the provider's listing envelope they arrive in.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

const PSEUDO_AUTHOR: &str = "[deleted]";

/// A top-level post as fetched from a listing. Never mutated after fetch.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Post {
    #[serde(rename = "id")]
    pub post_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(deserialize_with = "epoch_seconds")]
    pub created_utc: i64,
    #[serde(default = "deleted_author", deserialize_with = "author_or_deleted")]
    pub author: String,
    #[serde(default)]
    pub selftext: String,
}

/// A fetched comment, before ranking.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Comment {
    #[serde(rename = "id")]
    pub comment_id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default = "deleted_author", deserialize_with = "author_or_deleted")]
    pub author: String,
}

/// One top-level child of a post's comment listing.
#[derive(Clone, Debug, PartialEq)]
pub enum CommentNode {
    Comment(Comment),
    /// "Load more comments" continuation stub; carries the number of hidden comments.
    More { count: u64 },
}

impl CommentNode {
    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            CommentNode::Comment(c) => Some(c),
            CommentNode::More { .. } => None,
        }
    }
}

/// A comment kept for export, with its 1-based rank among its post's comments.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedComment {
    pub post_id: String,
    pub comment_id: String,
    pub comment_body: String,
    pub comment_score: i64,
    pub comment_author: String,
    pub comment_rank: usize,
}

// -------- provider envelope: {"kind":"Listing","data":{"after":..,"children":[{kind,data}]}} --------

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    pub kind: String,
    pub data: Value,
}

impl Listing {
    /// Posts (`t3`) in listing order; other kinds are skipped.
    pub fn into_posts(self) -> anyhow::Result<(Vec<Post>, Option<String>)> {
        let mut posts = Vec::with_capacity(self.data.children.len());
        for thing in self.data.children {
            if thing.kind != "t3" {
                tracing::debug!(kind = %thing.kind, "skipping non-post listing child");
                continue;
            }
            posts.push(serde_json::from_value(thing.data)?);
        }
        let after = self.data.after.filter(|a| !a.is_empty());
        Ok((posts, after))
    }

    /// Comments (`t1`) and continuation stubs (`more`) in listing order.
    pub fn into_comment_nodes(self) -> anyhow::Result<Vec<CommentNode>> {
        let mut nodes = Vec::with_capacity(self.data.children.len());
        for thing in self.data.children {
            match thing.kind.as_str() {
                "t1" => nodes.push(CommentNode::Comment(serde_json::from_value(thing.data)?)),
                "more" => {
                    let count = thing.data.get("count").and_then(Value::as_u64).unwrap_or(0);
                    nodes.push(CommentNode::More { count });
                }
                other => tracing::debug!(kind = %other, "skipping unexpected comment child"),
            }
        }
        Ok(nodes)
    }
}

/// Accepts integer or fractional epoch seconds (the provider sends `1650000000.0`).
fn epoch_seconds<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    let v = f64::deserialize(de)?;
    if !v.is_finite() {
        return Err(serde::de::Error::custom("created_utc is not a finite number"));
    }
    Ok(v.trunc() as i64)
}

fn deleted_author() -> String {
    PSEUDO_AUTHOR.to_string()
}

fn author_or_deleted<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let v: Option<String> = Option::deserialize(de)?;
    Ok(match v {
        Some(s) if !s.trim().is_empty() => s,
        _ => deleted_author(),
    })
}
