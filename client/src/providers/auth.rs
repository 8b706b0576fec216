//! Authentication service.

use crate::error::ServiceError;
use crate::validation::{LoginCredentials, Registration};

/// Account operations on the backend.
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request fails or the credentials are
    /// rejected.
    fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> impl std::future::Future<Output = Result<String, ServiceError>> + Send;

    /// Create an account. The new user still has to log in.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request fails; an email that is
    /// already registered yields [`ServiceError::Conflict`].
    fn register(
        &self,
        registration: &Registration,
    ) -> impl std::future::Future<Output = Result<(), ServiceError>> + Send;

    /// End the server-side session of the current bearer.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request fails.
    fn logout(&self) -> impl std::future::Future<Output = Result<(), ServiceError>> + Send;
}
