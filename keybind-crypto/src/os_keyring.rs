//! OS keychain backed keystore.
//!
//! The master key is a random 256-bit value stored base64-encoded in the
//! platform secret store (Keychain, Credential Manager, kernel keyring)
//! under `(service, alias)`. It is created on first use and cached in
//! memory afterwards.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{generate_random_key, MasterKey};
use crate::keystore::{open, seal, KeyCache, Keystore};
use keyring::Entry;
use tracing::{debug, info};

pub struct KeyringKeystore {
    service: String,
    cache: KeyCache,
}

impl KeyringKeystore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            cache: KeyCache::default(),
        }
    }

    fn entry(&self, alias: &str) -> CryptoResult<Entry> {
        Entry::new(&self.service, alias).map_err(|e| unavailable(alias, e))
    }

    fn load_or_create(&self, alias: &str) -> CryptoResult<MasterKey> {
        if let Some(key) = self.cache.get(alias) {
            return Ok(key);
        }

        let entry = self.entry(alias)?;
        let key = match entry.get_password() {
            Ok(encoded) => {
                debug!(service = %self.service, alias, "Loaded master key from OS keyring");
                MasterKey::from_base64(&encoded)?
            }
            Err(keyring::Error::NoEntry) => {
                let key = generate_random_key();
                entry
                    .set_password(&key.to_base64())
                    .map_err(|e| unavailable(alias, e))?;
                info!(service = %self.service, alias, "Created master key in OS keyring");
                key
            }
            Err(e) => return Err(unavailable(alias, e)),
        };

        self.cache.insert(alias, key.clone());
        Ok(key)
    }
}

fn unavailable(alias: &str, err: keyring::Error) -> CryptoError {
    CryptoError::KeyUnavailable {
        alias: alias.to_string(),
        reason: err.to_string(),
    }
}

impl Keystore for KeyringKeystore {
    fn kind(&self) -> &'static str {
        "os-keyring"
    }

    fn ensure_key(&self, alias: &str) -> CryptoResult<()> {
        self.load_or_create(alias).map(|_| ())
    }

    fn encrypt(&self, alias: &str, plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = self.load_or_create(alias)?;
        seal(&key, plaintext, aad)
    }

    fn decrypt(&self, alias: &str, combined: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = self.load_or_create(alias)?;
        open(&key, combined, aad)
    }

    fn delete_key(&self, alias: &str) -> CryptoResult<()> {
        self.cache.remove(alias);
        match self.entry(alias)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(unavailable(alias, e)),
        }
    }
}
