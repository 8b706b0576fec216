//! Types for book comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// A comment with its nested replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment identifier
    pub id: String,
    /// Author identifier
    pub user_id: String,
    /// Author display name
    #[serde(rename = "userName")]
    pub author_name: String,
    /// Body text
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// "Helpful" votes, as counted by the backend
    #[serde(default)]
    pub helpful_count: u32,
    /// "Not helpful" votes, as counted by the backend
    #[serde(default)]
    pub not_helpful_count: u32,
    /// Direct replies
    #[serde(default)]
    pub replies: Vec<Comment>,
}

/// Payload for creating a comment or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    /// Body text
    pub content: String,
    /// Comment being replied to, `None` for a top-level comment
    pub parent_comment_id: Option<String>,
}

/// Ordering of top-level comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingPolicy {
    /// Most helpful first, newest breaking ties.
    #[default]
    Relevant,
    /// Least helpful first, input order breaking ties.
    Unpopular,
    /// Newest first.
    Recent,
    /// Oldest first.
    Oldest,
}

impl std::str::FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relevant" => Ok(Self::Relevant),
            "unpopular" => Ok(Self::Unpopular),
            "recent" => Ok(Self::Recent),
            "oldest" => Ok(Self::Oldest),
            other => Err(format!("unknown ranking policy: {other}")),
        }
    }
}

/// Comments of one book.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentsState {
    /// Book whose comments are held
    pub book_id: Option<String>,
    /// Top-level comments in server order
    pub comments: Vec<Comment>,
    /// Whether a load is in flight
    pub is_loading: bool,
    /// Selected ordering
    pub policy: RankingPolicy,
    /// Message of the most recent failure
    pub last_error: Option<String>,
    /// Load generation; results of older generations are discarded
    pub generation: u64,
}

impl CommentsState {
    /// Top-level comments ordered by the selected policy.
    #[must_use]
    pub fn ranked(&self) -> Vec<Comment> {
        super::ranking::rank(&self.comments, self.policy)
    }
}

/// Inputs of the comments reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentsAction {
    /// Show the comments of `book_id`, replacing any other book.
    Load {
        /// Book
        book_id: String,
    },
    /// Post a comment or reply on the current book.
    Post {
        /// Body text
        content: String,
        /// Comment being replied to
        parent: Option<String>,
    },
    /// Vote on a comment of the current book.
    Vote {
        /// Comment
        comment_id: String,
        /// `true` for helpful
        helpful: bool,
    },
    /// Change the ordering.
    SetPolicy(RankingPolicy),

    /// A load returned.
    Loaded {
        /// Book the load was issued for
        book_id: String,
        /// Generation the load was issued in
        generation: u64,
        /// Comment tree
        comments: Vec<Comment>,
    },
    /// A load failed.
    LoadFailed {
        /// Book the load was issued for
        book_id: String,
        /// Generation the load was issued in
        generation: u64,
        /// Failure
        error: ServiceError,
    },
    /// A post or vote succeeded.
    MutationSucceeded {
        /// Book the mutation targeted
        book_id: String,
        /// What was done
        kind: MutationKind,
    },
    /// A post or vote failed.
    MutationFailed {
        /// Book the mutation targeted
        book_id: String,
        /// What was attempted
        kind: MutationKind,
        /// Failure
        error: ServiceError,
    },
}

/// The kind of comment mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// New comment or reply
    Post,
    /// Helpful / not-helpful vote
    Vote,
}
