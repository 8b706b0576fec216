use std::collections::HashMap;
use std::future::{Future, ready};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ServiceError;
use crate::providers::AuthService;
use crate::token::{self, Claims};
use crate::validation::{LoginCredentials, Registration};

use super::claims_for;

/// 2100-01-01T00:00:00Z
const FAR_FUTURE: i64 = 4_102_444_800;

#[derive(Debug, Default)]
struct Accounts {
    users: HashMap<String, (String, Claims)>,
    logout_calls: usize,
}

/// Account backend held in memory. Issued tokens are unsigned.
#[derive(Debug, Clone, Default)]
pub struct MockAuthService {
    accounts: Arc<Mutex<Accounts>>,
}

impl MockAuthService {
    /// Backend with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account whose login issues a token carrying `claims`.
    #[must_use]
    pub fn with_user(self, email: &str, password: &str, claims: Claims) -> Self {
        self.accounts().users.insert(email.to_owned(), (password.to_owned(), claims));
        self
    }

    /// Number of logout calls so far.
    #[must_use]
    pub fn logout_calls(&self) -> usize {
        self.accounts().logout_calls
    }

    fn accounts(&self) -> MutexGuard<'_, Accounts> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthService for MockAuthService {
    fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send {
        let result = match self.accounts().users.get(&credentials.email) {
            Some((password, claims)) if *password == credentials.password => {
                Ok(token::encode_unsigned(claims))
            },
            _ => Err(ServiceError::Unauthorized),
        };
        ready(result)
    }

    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send {
        let mut accounts = self.accounts();
        let result = if accounts.users.contains_key(&registration.email) {
            Err(ServiceError::Conflict("Email already registered".into()))
        } else {
            let subject = format!("user-{}", accounts.users.len() + 1);
            let mut claims = claims_for(&subject, &["USER"], FAR_FUTURE);
            claims.name = Some(registration.name.clone());
            accounts
                .users
                .insert(registration.email.clone(), (registration.password.clone(), claims));
            Ok(())
        };
        ready(result)
    }

    fn logout(&self) -> impl Future<Output = Result<(), ServiceError>> + Send {
        self.accounts().logout_calls += 1;
        ready(Ok(()))
    }
}
