use std::collections::VecDeque;
use std::future::{Future, ready};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ServiceError;
use crate::favorites::{BookSummary, FavoriteRecord, ItemId};
use crate::providers::FavoritesService;

#[derive(Debug, Default)]
struct Remote {
    records: Vec<ItemId>,
    list_failure: Option<ServiceError>,
    add_failures: VecDeque<ServiceError>,
    remove_failures: VecDeque<ServiceError>,
    list_calls: usize,
}

/// Favorites backend held in memory.
///
/// Adding an item that is already present answers
/// [`ServiceError::Conflict`], as the real backend does.
#[derive(Debug, Clone, Default)]
pub struct MockFavoritesService {
    remote: Arc<Mutex<Remote>>,
}

impl MockFavoritesService {
    /// Backend with no favorites.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose list returns `ids` verbatim, duplicates included.
    #[must_use]
    pub fn with_records(ids: &[&str]) -> Self {
        let service = Self::new();
        service.set_records(ids);
        service
    }

    /// Replace the remote list.
    pub fn set_records(&self, ids: &[&str]) {
        self.remote().records = ids.iter().map(|id| ItemId::from(*id)).collect();
    }

    /// Whether the backend holds `id`.
    #[must_use]
    pub fn remote_contains(&self, id: &str) -> bool {
        self.remote().records.iter().any(|r| r.as_str() == id)
    }

    /// Make every list call fail with `error`.
    pub fn fail_list(&self, error: ServiceError) {
        self.remote().list_failure = Some(error);
    }

    /// Make the next add fail with `error`.
    pub fn fail_next_add(&self, error: ServiceError) {
        self.remote().add_failures.push_back(error);
    }

    /// Make the next remove fail with `error`.
    pub fn fail_next_remove(&self, error: ServiceError) {
        self.remote().remove_failures.push_back(error);
    }

    /// Number of list calls so far.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.remote().list_calls
    }

    fn remote(&self) -> MutexGuard<'_, Remote> {
        self.remote.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FavoritesService for MockFavoritesService {
    fn list(&self) -> impl Future<Output = Result<Vec<FavoriteRecord>, ServiceError>> + Send {
        let mut remote = self.remote();
        remote.list_calls += 1;
        let result = match &remote.list_failure {
            Some(error) => Err(error.clone()),
            None => Ok(remote
                .records
                .iter()
                .enumerate()
                .map(|(n, id)| FavoriteRecord {
                    id: format!("fav-{n}"),
                    book: BookSummary {
                        id: Some(id.clone()),
                        title: format!("Book {id}"),
                        isbn: None,
                        genre: None,
                    },
                })
                .collect()),
        };
        ready(result)
    }

    fn add(&self, item: &ItemId) -> impl Future<Output = Result<(), ServiceError>> + Send {
        let mut remote = self.remote();
        let result = if let Some(error) = remote.add_failures.pop_front() {
            Err(error)
        } else if remote.records.contains(item) {
            Err(ServiceError::Conflict("Book is already in favorites".into()))
        } else {
            remote.records.push(item.clone());
            Ok(())
        };
        ready(result)
    }

    fn remove(&self, item: &ItemId) -> impl Future<Output = Result<(), ServiceError>> + Send {
        let mut remote = self.remote();
        let result = match remote.remove_failures.pop_front() {
            Some(error) => Err(error),
            None => {
                remote.records.retain(|r| r != item);
                Ok(())
            },
        };
        ready(result)
    }
}
