use crate::models::{CommentNode, RankedComment};

/// Keep the `top_n` highest-scoring comments of a post and number them 1..=top_n.
/// Continuation stubs are dropped; equal scores keep provider order.
pub fn rank_top_comments(post_id: &str, nodes: &[CommentNode], top_n: usize) -> Vec<RankedComment> {
    let mut comments: Vec<_> = nodes.iter().filter_map(CommentNode::as_comment).collect();
    comments.sort_by(|a, b| b.score.cmp(&a.score));

    comments
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, c)| RankedComment {
            post_id: post_id.to_string(),
            comment_id: c.comment_id.clone(),
            comment_body: c.body.clone(),
            comment_score: c.score,
            comment_author: c.author.clone(),
            comment_rank: i + 1,
        })
        .collect()
}
