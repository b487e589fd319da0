//! Secure-storage collaborator used for provider credentials.

use std::collections::HashMap;
use std::fmt;
use parking_lot::RwLock;

use crate::Error;

/// Keyed secret storage, typically backed by a platform keychain.
pub trait CredentialStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, secret: String) -> Result<(), Error>;
}

/// Process-local [`CredentialStore`].
#[derive(Default)]
pub struct MemoryCredentialStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one secret.
    pub fn with_secret(key: impl Into<String>, secret: impl Into<String>) -> Self {
        let store = Self::new();
        store.secrets.write().insert(key.into(), secret.into());
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.secrets
            .read()
            .get(key)
            .filter(|secret| !secret.trim().is_empty())
            .cloned()
    }

    fn set(&self, key: &str, secret: String) -> Result<(), Error> {
        if key.is_empty() {
            return Err(Error::config("Credential key must not be empty"));
        }
        self.secrets.write().insert(key.to_string(), secret);
        Ok(())
    }
}

// Only the keys are printed.
impl fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secrets = self.secrets.read();
        f.debug_struct("MemoryCredentialStore")
            .field("keys", &secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}
