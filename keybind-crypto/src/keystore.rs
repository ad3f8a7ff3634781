//! Keystore abstraction the credential store encrypts through.
//!
//! Consumers hold an `Arc<dyn Keystore>` and address keys by alias; they
//! never see raw key material. `KeyringKeystore` is the production
//! implementation, `PassphraseKeystore` serves hosts without an OS secret
//! store, and `MemoryKeystore` keeps keys in process memory for tests.

use crate::cipher::{self, EncryptedData};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_key, generate_random_key, KdfParams, MasterKey, Salt};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Trait for sealing and opening values under a named master key.
pub trait Keystore: Send + Sync {
    /// Short name of the implementation, for diagnostics.
    fn kind(&self) -> &'static str;

    /// Makes sure a key exists for `alias`, creating it if the backend allows.
    fn ensure_key(&self, alias: &str) -> CryptoResult<()>;

    /// Encrypts `plaintext` under `alias`, returning `nonce || ciphertext`.
    fn encrypt(&self, alias: &str, plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>>;

    /// Opens a blob produced by [`Keystore::encrypt`] with the same alias and aad.
    fn decrypt(&self, alias: &str, combined: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>>;

    /// Forgets the key for `alias`. Everything sealed under it becomes unreadable.
    fn delete_key(&self, alias: &str) -> CryptoResult<()>;
}

/// Alias-indexed cache of unwrapped master keys.
#[derive(Default)]
pub(crate) struct KeyCache {
    keys: RwLock<HashMap<String, MasterKey>>,
}

impl KeyCache {
    pub(crate) fn get(&self, alias: &str) -> Option<MasterKey> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(alias)
            .cloned()
    }

    pub(crate) fn insert(&self, alias: &str, key: MasterKey) {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(alias.to_string(), key);
    }

    pub(crate) fn remove(&self, alias: &str) -> bool {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(alias)
            .is_some()
    }
}

pub(crate) fn seal(key: &MasterKey, plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
    Ok(cipher::encrypt_with_aad(key, plaintext, aad)?.to_bytes())
}

pub(crate) fn open(key: &MasterKey, combined: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
    let encrypted = EncryptedData::from_bytes(combined)?;
    cipher::decrypt_with_aad(key, &encrypted, aad)
}

fn missing(alias: &str) -> CryptoError {
    CryptoError::KeyUnavailable {
        alias: alias.to_string(),
        reason: "no key for alias".to_string(),
    }
}

/// Process-local keystore. Keys are random and vanish with the process.
#[derive(Default)]
pub struct MemoryKeystore {
    cache: KeyCache,
}

impl MemoryKeystore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-loads a known key, so two instances can read each other's data.
    pub fn with_key(alias: &str, key: MasterKey) -> Self {
        let store = Self::default();
        store.cache.insert(alias, key);
        store
    }
}

impl Keystore for MemoryKeystore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn ensure_key(&self, alias: &str) -> CryptoResult<()> {
        if self.cache.get(alias).is_none() {
            self.cache.insert(alias, generate_random_key());
        }
        Ok(())
    }

    fn encrypt(&self, alias: &str, plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = self.cache.get(alias).ok_or_else(|| missing(alias))?;
        seal(&key, plaintext, aad)
    }

    fn decrypt(&self, alias: &str, combined: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = self.cache.get(alias).ok_or_else(|| missing(alias))?;
        open(&key, combined, aad)
    }

    fn delete_key(&self, alias: &str) -> CryptoResult<()> {
        self.cache.remove(alias);
        Ok(())
    }
}

/// Keystore backed by a single passphrase-derived key.
///
/// Every alias maps to the same Argon2id key; the salt must be persisted by
/// the caller or previously stored values cannot be opened again.
pub struct PassphraseKeystore {
    key: MasterKey,
}

impl PassphraseKeystore {
    /// Derives the key with default Argon2id parameters.
    pub fn new(passphrase: &str, salt: &Salt) -> CryptoResult<Self> {
        Self::with_params(passphrase, salt, &KdfParams::default())
    }

    pub fn with_params(passphrase: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<Self> {
        if passphrase.is_empty() {
            return Err(CryptoError::KeyDerivation("passphrase must not be empty".to_string()));
        }
        Ok(Self {
            key: derive_key(passphrase, salt, params)?,
        })
    }
}

impl Keystore for PassphraseKeystore {
    fn kind(&self) -> &'static str {
        "passphrase"
    }

    fn ensure_key(&self, _alias: &str) -> CryptoResult<()> {
        Ok(())
    }

    fn encrypt(&self, _alias: &str, plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        seal(&self.key, plaintext, aad)
    }

    fn decrypt(&self, _alias: &str, combined: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        open(&self.key, combined, aad)
    }

    fn delete_key(&self, _alias: &str) -> CryptoResult<()> {
        // Derived on demand; nothing is stored.
        Ok(())
    }
}
