//! Bearer token decoding.
//!
//! Tokens are three dot-separated segments (`header.payload.signature`).
//! Only the payload is read. The signature is NOT verified: decoded claims
//! drive what the client displays and which screens it offers, while the
//! backend stays the authority on every request.

use std::collections::BTreeSet;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Stable user identifier (`sub`).
    pub subject: String,
    /// Display name (`name`), when the backend includes it.
    pub name: Option<String>,
    /// Role names (`roles`), empty when absent.
    pub roles: BTreeSet<String>,
    /// Expiry in epoch seconds (`exp`).
    pub expires_at: i64,
}

impl Claims {
    /// A token is valid strictly before its expiry second.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() < self.expires_at
    }

    /// Expiry as a timestamp, if representable.
    #[must_use]
    pub fn expires_at_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }

    /// Whether the claims include `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Decode the claims of a bearer token without verifying its signature.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the token does not have three segments,
/// the payload is not base64url JSON, `sub` is missing or `exp` is not
/// numeric.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::MalformedStructure { segments: segments.len() });
    }

    let payload = segments[1].trim_end_matches('=').replace('+', "-").replace('/', "_");
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.as_bytes())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    let object: Map<String, Value> =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Json(e.to_string()))?;

    claims_from_object(&object)
}

fn claims_from_object(object: &Map<String, Value>) -> Result<Claims, DecodeError> {
    let subject = match object.get("sub") {
        Some(Value::String(sub)) if !sub.is_empty() => sub.clone(),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            return Err(DecodeError::MissingClaim("sub"));
        },
        Some(_) => return Err(DecodeError::InvalidClaim("sub")),
    };

    let expires_at = match object.get("exp") {
        None | Some(Value::Null) => return Err(DecodeError::MissingClaim("exp")),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(secs), _) => secs,
            // Fractional NumericDate: whole seconds are enough here
            #[allow(clippy::cast_possible_truncation)]
            (None, Some(secs)) if secs.is_finite() => secs.floor() as i64,
            _ => return Err(DecodeError::InvalidExpiry(n.to_string())),
        },
        Some(other) => return Err(DecodeError::InvalidExpiry(other.to_string())),
    };

    let name = match object.get("name") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(_) => return Err(DecodeError::InvalidClaim("name")),
    };

    let roles = match object.get("roles") {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned).ok_or(DecodeError::InvalidClaim("roles")))
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(DecodeError::InvalidClaim("roles")),
    };

    Ok(Claims { subject, name, roles, expires_at })
}

/// Build an unsigned token carrying `claims`.
///
/// The result decodes with [`decode`]; the backend would reject it. Used by
/// the in-memory auth service and by tests.
#[must_use]
pub fn encode_unsigned(claims: &Claims) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);

    let mut object = Map::new();
    object.insert("sub".into(), Value::String(claims.subject.clone()));
    object.insert("exp".into(), Value::from(claims.expires_at));
    if let Some(name) = &claims.name {
        object.insert("name".into(), Value::String(name.clone()));
    }
    object.insert(
        "roles".into(),
        Value::Array(claims.roles.iter().cloned().map(Value::String).collect()),
    );
    let payload = URL_SAFE_NO_PAD.encode(Value::Object(object).to_string());

    format!("{header}.{payload}.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn token_with_payload(json: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(json))
    }

    #[test]
    fn test_decode_full_claims() {
        let token = token_with_payload(
            r#"{"sub":"u-1","name":"Ana","roles":["USER","ADMIN"],"exp":1735693200}"#,
        );

        let claims = decode(&token).unwrap();

        assert_eq!(claims.subject, "u-1");
        assert_eq!(claims.name.as_deref(), Some("Ana"));
        assert!(claims.has_role("ADMIN"));
        assert_eq!(claims.roles.len(), 2);
        assert_eq!(claims.expires_at, 1_735_693_200);
    }

    #[test]
    fn test_optional_claims_default() {
        let claims = decode(&token_with_payload(r#"{"sub":"u-1","exp":10}"#)).unwrap();
        assert_eq!(claims.name, None);
        assert!(claims.roles.is_empty());
    }

    #[test]
    fn test_padded_payload_is_tolerated() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"sub":"u","exp":1}"#);
        assert!(payload.ends_with('='));
        let claims = decode(&format!("h.{payload}.s")).unwrap();
        assert_eq!(claims.subject, "u");
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(decode("   "), Err(DecodeError::Empty));
        assert_eq!(
            decode("only.two"),
            Err(DecodeError::MalformedStructure { segments: 2 })
        );
        assert!(matches!(decode("a.!!!.c"), Err(DecodeError::Base64(_))));
        assert!(matches!(
            decode(&token_with_payload("not json")),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode(&token_with_payload("[1,2]")),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_claim_errors() {
        assert_eq!(
            decode(&token_with_payload(r#"{"exp":10}"#)),
            Err(DecodeError::MissingClaim("sub"))
        );
        assert_eq!(
            decode(&token_with_payload(r#"{"sub":"u"}"#)),
            Err(DecodeError::MissingClaim("exp"))
        );
        assert!(matches!(
            decode(&token_with_payload(r#"{"sub":"u","exp":"tomorrow"}"#)),
            Err(DecodeError::InvalidExpiry(_))
        ));
        assert_eq!(
            decode(&token_with_payload(r#"{"sub":"u","exp":1,"roles":"ADMIN"}"#)),
            Err(DecodeError::InvalidClaim("roles"))
        );
    }

    #[test]
    fn test_validity_boundary() {
        let claims = Claims {
            subject: "u".into(),
            name: None,
            roles: BTreeSet::new(),
            expires_at: 100,
        };
        let at = |secs| DateTime::from_timestamp(secs, 0).unwrap();

        assert!(claims.is_valid_at(at(99)));
        assert!(!claims.is_valid_at(at(100)));
        assert!(!claims.is_valid_at(at(101)));
    }

    #[test]
    fn test_unsigned_token_decodes() {
        let claims = Claims {
            subject: "u-9".into(),
            name: Some("Rui".into()),
            roles: BTreeSet::from(["BIBLIOTECARIO".to_owned()]),
            expires_at: 2_000_000_000,
        };
        assert_eq!(decode(&encode_unsigned(&claims)).unwrap(), claims);
    }

    proptest! {
        #[test]
        fn prop_decode_never_panics(input in ".{0,200}") {
            let _ = decode(&input);
        }

        #[test]
        fn prop_dotted_garbage_is_rejected(
            a in "[a-z]{0,8}",
            b in "[!@#$%^&*]{1,8}",
            c in "[a-z]{0,8}",
        ) {
            let token = format!("{a}.{b}.{c}");
            prop_assert!(decode(&token).is_err());
        }
    }
}
