use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::CredentialError;
use crate::providers::CredentialStore;

/// Credential slot held in memory.
#[derive(Debug, Clone, Default)]
pub struct MockCredentialStore {
    slot: Arc<Mutex<Option<String>>>,
    fail: Arc<AtomicBool>,
}

impl MockCredentialStore {
    /// Empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `token` in the slot directly.
    pub fn set(&self, token: &str) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
    }

    /// Current slot contents.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Make every operation fail (or succeed again).
    pub fn fail_io(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CredentialError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(CredentialError::Io("storage unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl CredentialStore for MockCredentialStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        self.check()?;
        Ok(self.get())
    }

    fn store(&self, token: &str) -> Result<(), CredentialError> {
        self.check()?;
        self.set(token);
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        self.check()?;
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
