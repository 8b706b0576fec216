//! Error types for the Libris client.
//!
//! Each boundary has its own enum: the token codec, the REST services, the
//! credential slot, form validation and configuration. [`ClientError`]
//! gathers them for the [`App`](crate::app::App) surface.

use libris_runtime::StoreError;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures while decoding a bearer token.
///
/// These are never shown to the user: a token that cannot be decoded simply
/// leaves the session unauthenticated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The token is empty or whitespace.
    #[error("Token is empty")]
    Empty,

    /// The token does not have three dot-separated segments.
    #[error("Malformed token: expected 3 segments, found {segments}")]
    MalformedStructure {
        /// Number of segments found
        segments: usize,
    },

    /// The payload segment is not valid base64url.
    #[error("Invalid base64 payload: {0}")]
    Base64(String),

    /// The payload is not a JSON object.
    #[error("Invalid JSON payload: {0}")]
    Json(String),

    /// A required claim is absent.
    #[error("Missing claim: {0}")]
    MissingClaim(&'static str),

    /// A claim has the wrong type.
    #[error("Invalid claim: {0}")]
    InvalidClaim(&'static str),

    /// The `exp` claim is not a number.
    #[error("Invalid expiry claim: {0}")]
    InvalidExpiry(String),
}

/// Failures reported by the REST services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    // ═══════════════════════════════════════════════════════════
    // Transport
    // ═══════════════════════════════════════════════════════════

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Deserialize(String),

    // ═══════════════════════════════════════════════════════════
    // Status codes
    // ═══════════════════════════════════════════════════════════

    /// 409: the resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 401: the bearer credential was missing or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// 500-504: the backend failed.
    #[error("Server error (status {status})")]
    Server {
        /// HTTP status code
        status: u16,
    },

    /// Any other non-success status.
    #[error("HTTP error (status {status}): {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Message from the error body, or the status reason
        message: String,
    },
}

impl ServiceError {
    /// Returns `true` for a 409 response.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns `true` for a 500-504 response.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Conflict(_) => Some(409),
            Self::Unauthorized => Some(401),
            Self::Server { status } | Self::Http { status, .. } => Some(*status),
            Self::Network(_) | Self::Deserialize(_) => None,
        }
    }
}

/// Failures of the durable credential slot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Reading or writing the slot failed.
    #[error("Credential storage I/O failed: {0}")]
    Io(String),
}

impl From<std::io::Error> for CredentialError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Form validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("{field} is required")]
    Required {
        /// Field name
        field: &'static str,
    },

    /// The display name is too short or too long.
    #[error("Name must be between {min} and {max} characters")]
    NameLength {
        /// Minimum length
        min: usize,
        /// Maximum length
        max: usize,
    },

    /// The email address is not well formed.
    #[error("Invalid email address")]
    InvalidEmail,

    /// The password is shorter than the minimum.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum length
        min: usize,
    },

    /// The password lacks a required character class or uses a disallowed one.
    #[error("Password must mix lowercase, uppercase, digits and one of @$!%*?&")]
    WeakPassword,
}

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The API base URL is not an http(s) URL.
    #[error("Invalid API URL {url:?}: {reason}")]
    InvalidUrl {
        /// Offending value
        url: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),
}

/// Umbrella error for [`App`](crate::app::App) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Token decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A REST call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The credential slot failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Input was rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A store rejected an action.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_helpers() {
        assert!(ServiceError::Conflict("dup".into()).is_conflict());
        assert!(!ServiceError::Unauthorized.is_conflict());
        assert!(ServiceError::Server { status: 503 }.is_server_error());
        assert_eq!(ServiceError::Network("down".into()).status(), None);
        assert_eq!(
            ServiceError::Http { status: 404, message: "missing".into() }.status(),
            Some(404)
        );
    }

    #[test]
    fn test_client_error_is_transparent() {
        let err: ClientError = ValidationError::InvalidEmail.into();
        assert_eq!(err.to_string(), "Invalid email address");
    }
}
