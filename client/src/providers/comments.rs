//! Remote comments of a book.

use crate::comments::{Comment, NewComment};
use crate::error::ServiceError;

/// Comment threads stored by the backend.
pub trait CommentService: Send + Sync {
    /// Top-level comments of `book_id`, replies nested.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request fails.
    fn list(
        &self,
        book_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Comment>, ServiceError>> + Send;

    /// Create a comment or reply.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request fails.
    fn create(
        &self,
        book_id: &str,
        comment: &NewComment,
    ) -> impl std::future::Future<Output = Result<Comment, ServiceError>> + Send;

    /// Record a helpful / not-helpful vote. Counters are recomputed by the
    /// backend; re-list to observe them.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request fails.
    fn vote(
        &self,
        book_id: &str,
        comment_id: &str,
        helpful: bool,
    ) -> impl std::future::Future<Output = Result<(), ServiceError>> + Send;
}
