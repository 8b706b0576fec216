//! Login and registration input.
//!
//! Validation runs before any request is sent so that obviously bad input
//! never reaches the backend.

use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 8;
const PASSWORD_SYMBOLS: &str = "@$!%*?&";

/// Login form.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

impl LoginCredentials {
    /// Build a login form.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// Every problem with the form, in field order.
    #[must_use]
    pub fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        if self.password.is_empty() {
            errors.push(ValidationError::Required { field: "password" });
        }
        errors
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        first_error(self.errors())
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration form.
#[derive(Clone, Serialize)]
pub struct Registration {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

impl Registration {
    /// Build a registration form.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), email: email.into(), password: password.into() }
    }

    /// Every problem with the form, in field order.
    #[must_use]
    pub fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            errors.push(ValidationError::Required { field: "name" });
        } else if !(NAME_MIN..=NAME_MAX).contains(&name_len) {
            errors.push(ValidationError::NameLength { min: NAME_MIN, max: NAME_MAX });
        }

        check_email(&self.email, &mut errors);

        if self.password.chars().count() < PASSWORD_MIN {
            errors.push(ValidationError::PasswordTooShort { min: PASSWORD_MIN });
        } else if !is_strong_password(&self.password) {
            errors.push(ValidationError::WeakPassword);
        }

        errors
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        first_error(self.errors())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn first_error(errors: Vec<ValidationError>) -> Result<(), ValidationError> {
    errors.into_iter().next().map_or(Ok(()), Err)
}

fn check_email(email: &str, errors: &mut Vec<ValidationError>) {
    if email.trim().is_empty() {
        errors.push(ValidationError::Required { field: "email" });
    } else if !is_valid_email(email) {
        errors.push(ValidationError::InvalidEmail);
    }
}

/// Loose structural email check: `local@domain.tld`, no whitespace.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// Lowercase, uppercase, digit and symbol present; nothing outside
/// ASCII letters, digits and the allowed symbols.
fn is_strong_password(password: &str) -> bool {
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c));

    allowed
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

/// Strength meter score from 0 (empty) to 4 (strong).
///
/// Under 8 characters scores 1 (0 when empty). From 8 characters the score
/// counts character classes (lowercase, uppercase, digit, other): 12+
/// characters with all four score 4, three or more classes score 3, and
/// anything else 2.
#[must_use]
pub fn password_strength(password: &str) -> u8 {
    let len = password.chars().count();
    if len < PASSWORD_MIN {
        return u8::from(len > 0);
    }

    let classes = [
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ]
    .into_iter()
    .filter(|passed| *passed)
    .count();

    match (len, classes) {
        (12.., 4) => 4,
        (_, 3..) => 3,
        _ => 2,
    }
}
