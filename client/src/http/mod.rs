//! REST transport.
//!
//! [`ApiClient`] wraps a `reqwest` client with the behaviour every service
//! shares: the base URL, the bearer credential from the credential slot,
//! and status-code mapping into [`ServiceError`]. A 500-504 response also
//! sends the user to [`Route::ServerError`].

mod auth;
mod comments;
mod favorites;

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ConfigError, ServiceError};
use crate::providers::{CredentialStore, Navigator};
use crate::routes::Route;

pub use auth::HttpAuthService;
pub use comments::HttpCommentService;
pub use favorites::HttpFavoritesService;

/// Shared HTTP plumbing for the REST services.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_url = Url::parse(&config.api_url).map_err(|_| ConfigError::InvalidUrl {
            url: config.api_url.clone(),
            reason: "not a valid URL",
        })?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            credentials,
            navigator,
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `segments` appended to the base URL, each percent-encoded.
    pub(crate) fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // http(s) URLs always have a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Request without credentials (login, register).
    pub(crate) fn public(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.url_for(segments))
    }

    /// Request carrying the stored bearer token, if there is one.
    pub(crate) fn authorized(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let request = self.public(method, segments);
        match self.credentials.load() {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(error) => {
                tracing::warn!(%error, "Could not read credential; sending request without it");
                request
            },
        }
    }

    /// Send `request` and map non-success statuses to [`ServiceError`].
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            code @ 500..=504 => {
                tracing::error!(status = code, "Backend failure");
                self.navigator.navigate(Route::ServerError);
                Err(ServiceError::Server { status: code })
            },
            _ if status == StatusCode::UNAUTHORIZED => Err(ServiceError::Unauthorized),
            _ if status == StatusCode::CONFLICT => {
                Err(ServiceError::Conflict(error_message(status, response).await))
            },
            code => Err(ServiceError::Http {
                status: code,
                message: error_message(status, response).await,
            }),
        }
    }

    /// Decode a JSON response body.
    pub(crate) async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Deserialize(e.to_string()))
    }
}

/// `message` field of a JSON error body, else the raw body, else the
/// status reason.
async fn error_message(status: StatusCode, response: Response) -> String {
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_owned))
        .unwrap_or(body);

    if message.trim().is_empty() {
        status.canonical_reason().unwrap_or("Request failed").to_owned()
    } else {
        message
    }
}
