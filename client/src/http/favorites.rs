use std::future::Future;

use reqwest::Method;
use serde::Serialize;
use tracing::Instrument;

use crate::error::ServiceError;
use crate::favorites::{FavoriteRecord, ItemId};
use crate::providers::FavoritesService;

use super::ApiClient;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddFavorite<'a> {
    livro_id: &'a ItemId,
}

/// [`FavoritesService`] over `/favoritos`.
#[derive(Clone)]
pub struct HttpFavoritesService {
    api: ApiClient,
}

impl HttpFavoritesService {
    /// Service using `api`.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl FavoritesService for HttpFavoritesService {
    fn list(&self) -> impl Future<Output = Result<Vec<FavoriteRecord>, ServiceError>> + Send {
        let api = self.api.clone();
        let request = api.authorized(Method::GET, &["favoritos"]);

        async move {
            let response = api.send(request).await?;
            let records: Vec<FavoriteRecord> = ApiClient::json(response).await?;
            tracing::debug!(count = records.len(), "Fetched favorites");
            Ok(records)
        }
        .instrument(tracing::debug_span!("favorites_list"))
    }

    fn add(&self, item: &ItemId) -> impl Future<Output = Result<(), ServiceError>> + Send {
        let api = self.api.clone();
        let request = api
            .authorized(Method::POST, &["favoritos"])
            .json(&AddFavorite { livro_id: item });

        async move {
            api.send(request).await?;
            Ok(())
        }
        .instrument(tracing::debug_span!("favorites_add", item = %item))
    }

    fn remove(&self, item: &ItemId) -> impl Future<Output = Result<(), ServiceError>> + Send {
        let api = self.api.clone();
        let request = api.authorized(Method::DELETE, &["favoritos", item.as_str()]);

        async move {
            api.send(request).await?;
            Ok(())
        }
        .instrument(tracing::debug_span!("favorites_remove", item = %item))
    }
}
