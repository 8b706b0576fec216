use std::future::Future;

use reqwest::Method;
use serde::Deserialize;
use tracing::Instrument;

use crate::error::ServiceError;
use crate::providers::AuthService;
use crate::validation::{LoginCredentials, Registration};

use super::ApiClient;

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// [`AuthService`] over `/auth`.
#[derive(Clone)]
pub struct HttpAuthService {
    api: ApiClient,
}

impl HttpAuthService {
    /// Service using `api`.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl AuthService for HttpAuthService {
    fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send {
        let api = self.api.clone();
        let request = api.public(Method::POST, &["auth", "login"]).json(credentials);

        async move {
            let response = api.send(request).await?;
            let TokenResponse { token } = ApiClient::json(response).await?;
            tracing::info!("Login accepted");
            Ok(token)
        }
        .instrument(tracing::info_span!("auth_login"))
    }

    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send {
        let api = self.api.clone();
        let request = api.public(Method::POST, &["auth", "register"]).json(registration);

        async move {
            // The created user is not needed; the caller logs in separately
            api.send(request).await?;
            tracing::info!("Account created");
            Ok(())
        }
        .instrument(tracing::info_span!("auth_register"))
    }

    fn logout(&self) -> impl Future<Output = Result<(), ServiceError>> + Send {
        let api = self.api.clone();
        let request = api.authorized(Method::POST, &["auth", "logout"]);

        async move {
            api.send(request).await?;
            Ok(())
        }
        .instrument(tracing::info_span!("auth_logout"))
    }
}
