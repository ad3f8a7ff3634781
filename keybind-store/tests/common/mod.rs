//! Shared test helpers for store tests.

#![allow(dead_code)]

use std::sync::Arc;

use keybind_crypto::{CryptoError, CryptoResult, Keystore, MemoryKeystore};
use keybind_store::{CredentialStore, SqliteStorage, DEFAULT_KEY_ALIAS};

/// An in-memory store plus a handle on its backend for raw inspection.
pub fn memory_store() -> (Arc<SqliteStorage>, CredentialStore) {
    let backend = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let store = CredentialStore::new(
        backend.clone(),
        Arc::new(MemoryKeystore::new()),
        DEFAULT_KEY_ALIAS,
    )
    .unwrap();
    (backend, store)
}

/// A keystore whose key can never be created.
pub struct BrokenKeystore;

impl Keystore for BrokenKeystore {
    fn kind(&self) -> &'static str {
        "broken"
    }

    fn ensure_key(&self, alias: &str) -> CryptoResult<()> {
        Err(CryptoError::KeyUnavailable {
            alias: alias.to_string(),
            reason: "keystore offline".to_string(),
        })
    }

    fn encrypt(&self, alias: &str, _plaintext: &[u8], _aad: &[u8]) -> CryptoResult<Vec<u8>> {
        self.ensure_key(alias).map(|_| Vec::new())
    }

    fn decrypt(&self, alias: &str, _combined: &[u8], _aad: &[u8]) -> CryptoResult<Vec<u8>> {
        self.ensure_key(alias).map(|_| Vec::new())
    }

    fn delete_key(&self, _alias: &str) -> CryptoResult<()> {
        Ok(())
    }
}
