//! Ordering and flattening of comment trees.
//!
//! Ranking applies to top-level comments only; replies keep the order the
//! backend delivered them in.

use std::cmp::{Ordering, Reverse};

use super::types::{Comment, RankingPolicy};

/// Indentation cap used by [`flatten_for_display`] callers that have no
/// preference of their own.
pub const DEFAULT_MAX_INDENT: usize = 3;

/// Order top-level comments by `policy`.
///
/// Returns a sorted copy; `comments` is left untouched. The sort is stable,
/// so equal keys keep their input order.
#[must_use]
pub fn rank(comments: &[Comment], policy: RankingPolicy) -> Vec<Comment> {
    let mut ranked = comments.to_vec();
    match policy {
        RankingPolicy::Relevant => ranked.sort_by(relevance),
        RankingPolicy::Unpopular => ranked.sort_by_key(|c| c.helpful_count),
        RankingPolicy::Recent => ranked.sort_by_key(|c| Reverse(c.created_at)),
        RankingPolicy::Oldest => ranked.sort_by_key(|c| c.created_at),
    }
    ranked
}

fn relevance(a: &Comment, b: &Comment) -> Ordering {
    b.helpful_count
        .cmp(&a.helpful_count)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Walk the comment tree in display order.
///
/// Yields `(indent, comment)` pairs in pre-order: each comment is followed
/// by its replies. Indentation grows with depth but stops at `max_indent`.
/// The walk uses an explicit stack, so arbitrarily deep reply chains are
/// safe.
#[must_use]
pub fn flatten_for_display(comments: &[Comment], max_indent: usize) -> Vec<(usize, &Comment)> {
    let mut out = Vec::new();
    let mut stack: Vec<(usize, &Comment)> = comments.iter().rev().map(|c| (0, c)).collect();

    while let Some((depth, comment)) = stack.pop() {
        out.push((depth.min(max_indent), comment));
        stack.extend(comment.replies.iter().rev().map(|reply| (depth + 1, reply)));
    }

    out
}

/// Number of comments in the tree, replies included.
#[must_use]
pub fn count_all(comments: &[Comment]) -> usize {
    let mut count = 0;
    let mut stack: Vec<&Comment> = comments.iter().collect();
    while let Some(comment) = stack.pop() {
        count += 1;
        stack.extend(comment.replies.iter());
    }
    count
}
