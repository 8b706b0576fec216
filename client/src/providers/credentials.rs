//! Durable credential slot.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::CredentialError;

/// Key of the single credential slot.
pub const CREDENTIAL_KEY: &str = "authToken";

/// Durable storage for the raw bearer token.
///
/// One key ([`CREDENTIAL_KEY`]) holding one opaque string. Implementations
/// must survive restarts; reads of a missing slot return `Ok(None)`.
pub trait CredentialStore: Send + Sync {
    /// Read the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>, CredentialError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the backing storage cannot be written.
    fn store(&self, token: &str) -> Result<(), CredentialError>;

    /// Remove the stored token. Clearing an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the backing storage cannot be written.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// Credential slot backed by a file named [`CREDENTIAL_KEY`] in a directory.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Slot stored inside `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(CREDENTIAL_KEY) }
    }

    /// File holding the token.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, token: &str) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash never leaves half a token behind
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, token)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Credential slot that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn store(&self, token: &str) -> Result<(), CredentialError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}
