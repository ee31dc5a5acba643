//! The seam between the pipeline and the listing provider.

use crate::config::TimeFilter;
use crate::models::{CommentNode, Post};
use anyhow::Result;

/// Lazy, pull-based stream of posts in the provider's ranking order.
pub type PostStream<'a> = Box<dyn Iterator<Item = Result<Post>> + 'a>;

pub trait ListingSource {
    /// A fresh pass over the top listing. Pages are fetched only as the iterator is pulled.
    fn top_posts(&self, time_filter: TimeFilter) -> PostStream<'_>;

    /// Top-level comment children of `post_id`, in provider order, continuation stubs included.
    fn comments(&self, post_id: &str) -> Result<Vec<CommentNode>>;
}
