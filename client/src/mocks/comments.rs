use std::collections::{HashMap, VecDeque};
use std::future::{Future, ready};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::comments::{Comment, NewComment};
use crate::error::ServiceError;
use crate::providers::CommentService;

#[derive(Debug, Default)]
struct Threads {
    books: HashMap<String, Vec<Comment>>,
    vote_failures: VecDeque<ServiceError>,
    list_calls: usize,
    next_id: u64,
}

/// Comment backend held in memory. Votes change the stored counters, so a
/// reload observes them.
#[derive(Debug, Clone, Default)]
pub struct MockCommentService {
    threads: Arc<Mutex<Threads>>,
}

fn base_time() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_735_689_600)
}

fn find_mut<'c>(comments: &'c mut [Comment], id: &str) -> Option<&'c mut Comment> {
    for comment in comments {
        if comment.id == id {
            return Some(comment);
        }
        if let Some(found) = find_mut(&mut comment.replies, id) {
            return Some(found);
        }
    }
    None
}

impl MockCommentService {
    /// Backend with no comments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level comment to `book_id`, created `offset_secs` after a
    /// fixed base time.
    pub fn seed(&self, book_id: &str, id: &str, author: &str, helpful: u32, offset_secs: i64) {
        let comment = Comment {
            id: id.to_owned(),
            user_id: format!("user-{author}"),
            author_name: author.to_owned(),
            content: format!("Comment by {author}"),
            created_at: base_time() + Duration::seconds(offset_secs),
            helpful_count: helpful,
            not_helpful_count: 0,
            replies: Vec::new(),
        };
        self.threads().books.entry(book_id.to_owned()).or_default().push(comment);
    }

    /// Make the next vote fail with `error`.
    pub fn fail_next_vote(&self, error: ServiceError) {
        self.threads().vote_failures.push_back(error);
    }

    /// Number of list calls so far.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.threads().list_calls
    }

    fn threads(&self) -> MutexGuard<'_, Threads> {
        self.threads.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CommentService for MockCommentService {
    fn list(
        &self,
        book_id: &str,
    ) -> impl Future<Output = Result<Vec<Comment>, ServiceError>> + Send {
        let mut threads = self.threads();
        threads.list_calls += 1;
        ready(Ok(threads.books.get(book_id).cloned().unwrap_or_default()))
    }

    fn create(
        &self,
        book_id: &str,
        comment: &NewComment,
    ) -> impl Future<Output = Result<Comment, ServiceError>> + Send {
        let mut threads = self.threads();
        threads.next_id += 1;
        let n = threads.next_id;
        let created = Comment {
            id: format!("new-{n}"),
            user_id: "mock-user".into(),
            author_name: "You".into(),
            content: comment.content.clone(),
            created_at: base_time()
                + Duration::days(1)
                + Duration::seconds(i64::try_from(n).unwrap_or(0)),
            helpful_count: 0,
            not_helpful_count: 0,
            replies: Vec::new(),
        };

        let thread = threads.books.entry(book_id.to_owned()).or_default();
        let result = match &comment.parent_comment_id {
            None => {
                thread.push(created.clone());
                Ok(created)
            },
            Some(parent_id) => match find_mut(thread, parent_id) {
                Some(parent) => {
                    parent.replies.push(created.clone());
                    Ok(created)
                },
                None => Err(ServiceError::Http {
                    status: 404,
                    message: "Comment not found".into(),
                }),
            },
        };
        ready(result)
    }

    fn vote(
        &self,
        book_id: &str,
        comment_id: &str,
        helpful: bool,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send {
        let mut threads = self.threads();
        let result = if let Some(error) = threads.vote_failures.pop_front() {
            Err(error)
        } else {
            let target = threads.books.get_mut(book_id).and_then(|t| find_mut(t, comment_id));
            match target {
                Some(comment) if helpful => {
                    comment.helpful_count += 1;
                    Ok(())
                },
                Some(comment) => {
                    comment.not_helpful_count += 1;
                    Ok(())
                },
                None => Err(ServiceError::Http {
                    status: 404,
                    message: "Comment not found".into(),
                }),
            }
        };
        ready(result)
    }
}
