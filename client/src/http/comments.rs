use std::future::Future;

use reqwest::Method;
use tracing::Instrument;

use crate::comments::{Comment, NewComment};
use crate::error::ServiceError;
use crate::providers::CommentService;

use super::ApiClient;

/// [`CommentService`] over `/books/{id}/comments`.
#[derive(Clone)]
pub struct HttpCommentService {
    api: ApiClient,
}

impl HttpCommentService {
    /// Service using `api`.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl CommentService for HttpCommentService {
    fn list(
        &self,
        book_id: &str,
    ) -> impl Future<Output = Result<Vec<Comment>, ServiceError>> + Send {
        let api = self.api.clone();
        let request = api.authorized(Method::GET, &["books", book_id, "comments"]);

        async move {
            let response = api.send(request).await?;
            ApiClient::json(response).await
        }
        .instrument(tracing::debug_span!("comments_list", book_id))
    }

    fn create(
        &self,
        book_id: &str,
        comment: &NewComment,
    ) -> impl Future<Output = Result<Comment, ServiceError>> + Send {
        let api = self.api.clone();
        let request = api
            .authorized(Method::POST, &["books", book_id, "comments"])
            .json(comment);

        async move {
            let response = api.send(request).await?;
            ApiClient::json(response).await
        }
        .instrument(tracing::debug_span!("comments_create", book_id))
    }

    fn vote(
        &self,
        book_id: &str,
        comment_id: &str,
        helpful: bool,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send {
        let api = self.api.clone();
        let request = api
            .authorized(Method::POST, &["books", book_id, "comments", comment_id, "vote"])
            .query(&[("helpful", helpful)]);

        async move {
            api.send(request).await?;
            Ok(())
        }
        .instrument(tracing::debug_span!("comments_vote", book_id, comment_id, helpful))
    }
}
