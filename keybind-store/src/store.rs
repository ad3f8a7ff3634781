//! The encrypted credential store.
//!
//! Owns the durable copy of the credential record. Every value is sealed
//! through the keystore with its storage key as associated data before it
//! reaches the backend.
//!
//! Concurrency: a reader/writer gate wraps the backend. Reads share the
//! gate, so a multi-field snapshot never observes half of a write; writes
//! hold it exclusively and commit their batch in one backend transaction.
//!
//! Corruption: a value that cannot be decoded or decrypted is logged and
//! reported as absent. Reads never fail.

use crate::backend::{SecureStorage, SqliteStorage, StorageOp};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::record::{CredentialRecord, CredentialUpdate, Field, Preferences};
use base64::{Engine, engine::general_purpose::STANDARD};
use keybind_crypto::Keystore;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Backend and keystore kinds in use, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageInfo {
    pub backend: &'static str,
    pub keystore: &'static str,
    pub key_alias: String,
}

pub struct CredentialStore {
    backend: Arc<dyn SecureStorage>,
    keystore: Arc<dyn Keystore>,
    key_alias: String,
    gate: RwLock<()>,
}

impl CredentialStore {
    /// Creates a store over an existing backend.
    ///
    /// Fails with [`StoreError::KeyUnavailable`] if the keystore cannot
    /// provide the master key; the store refuses to run unencrypted.
    pub fn new(
        backend: Arc<dyn SecureStorage>,
        keystore: Arc<dyn Keystore>,
        key_alias: impl Into<String>,
    ) -> StoreResult<Self> {
        let key_alias = key_alias.into();
        keystore
            .ensure_key(&key_alias)
            .map_err(StoreError::KeyUnavailable)?;

        debug!(
            backend = backend.kind(),
            keystore = keystore.kind(),
            alias = %key_alias,
            "Credential store opened"
        );

        Ok(Self {
            backend,
            keystore,
            key_alias,
            gate: RwLock::new(()),
        })
    }

    /// Opens the SQLite database named by `config`.
    pub fn open(config: &StoreConfig, keystore: Arc<dyn Keystore>) -> StoreResult<Self> {
        let backend = SqliteStorage::open(&config.db_path)?;
        Self::new(Arc::new(backend), keystore, config.key_alias.clone())
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory(keystore: Arc<dyn Keystore>) -> StoreResult<Self> {
        let backend = SqliteStorage::open_in_memory()?;
        Self::new(Arc::new(backend), keystore, crate::config::DEFAULT_KEY_ALIAS)
    }

    pub fn storage_info(&self) -> StorageInfo {
        StorageInfo {
            backend: self.backend.kind(),
            keystore: self.keystore.kind(),
            key_alias: self.key_alias.clone(),
        }
    }

    fn read_gate(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_gate(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ── encoding ─────────────────────────────────────────────────

    fn seal(&self, field: Field, plaintext: &str) -> StoreResult<String> {
        let sealed = self
            .keystore
            .encrypt(&self.key_alias, plaintext.as_bytes(), field.key().as_bytes())
            .map_err(StoreError::Encryption)?;
        Ok(STANDARD.encode(sealed))
    }

    fn unseal(&self, field: Field, stored: &str) -> StoreResult<String> {
        let corrupt = |reason: String| StoreError::Corrupt {
            key: field.key().to_string(),
            reason,
        };
        let bytes = STANDARD
            .decode(stored)
            .map_err(|e| corrupt(format!("invalid base64: {e}")))?;
        let plaintext = self
            .keystore
            .decrypt(&self.key_alias, &bytes, field.key().as_bytes())
            .map_err(|e| corrupt(e.to_string()))?;
        String::from_utf8(plaintext).map_err(|e| corrupt(format!("invalid UTF-8: {e}")))
    }

    /// Reads and decrypts one field. Caller holds the gate.
    fn load(&self, field: Field) -> Option<String> {
        let stored = match self.backend.get(field.key()) {
            Ok(Some(v)) => v,
            Ok(None) => return None,
            Err(e) => {
                warn!(field = %field, "Failed to read stored value, treating as absent: {}", e);
                return None;
            }
        };
        match self.unseal(field, &stored) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(field = %field, "{}", e);
                None
            }
        }
    }

    fn load_i64(&self, field: Field) -> Option<i64> {
        let raw = self.load(field)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(field = %field, "Stored value is not an integer, treating as absent");
                None
            }
        }
    }

    fn load_bool(&self, field: Field) -> bool {
        matches!(self.load(field).as_deref(), Some("true"))
    }

    fn load_record(&self) -> CredentialRecord {
        CredentialRecord {
            license_key: self.load(Field::LicenseKey),
            bound_fingerprint: self.load(Field::BoundFingerprint),
            session_token: self.load(Field::SessionToken),
            refresh_token: self.load(Field::RefreshToken),
            token_expiry: self.load_i64(Field::TokenExpiry),
            registered_at: self.load_i64(Field::RegisteredAt),
        }
    }

    /// Encrypts and commits an update. Caller holds the write gate.
    fn commit(&self, update: &CredentialUpdate) -> StoreResult<()> {
        if update.is_empty() {
            return Ok(());
        }
        let mut ops = Vec::with_capacity(update.changes.len());
        for (field, value) in &update.changes {
            ops.push(match value {
                Some(v) => StorageOp::Set {
                    key: field.key().to_string(),
                    value: self.seal(*field, v)?,
                },
                None => StorageOp::Remove {
                    key: field.key().to_string(),
                },
            });
        }
        self.backend.apply(&ops)?;
        let fields: Vec<&str> = update.fields().map(Field::key).collect();
        debug!(?fields, "Credential fields written");
        Ok(())
    }

    // ── snapshots ────────────────────────────────────────────────

    /// Reads the whole credential record as one consistent snapshot.
    pub fn record(&self) -> CredentialRecord {
        let _gate = self.read_gate();
        self.load_record()
    }

    pub fn preferences(&self) -> Preferences {
        let _gate = self.read_gate();
        Preferences {
            language: self.load(Field::Language),
            remember_license: self.load_bool(Field::RememberLicense),
            auto_login: self.load_bool(Field::AutoLogin),
        }
    }

    // ── generic access ───────────────────────────────────────────

    /// Reads one field as text. Absent, unreadable and corrupt all give `None`.
    pub fn get(&self, field: Field) -> Option<String> {
        let _gate = self.read_gate();
        self.load(field)
    }

    pub fn set(&self, field: Field, value: &str) -> StoreResult<()> {
        self.apply(CredentialUpdate::new().set(field, value))
    }

    pub fn remove(&self, field: Field) -> StoreResult<()> {
        self.apply(CredentialUpdate::new().remove(field))
    }

    /// Commits `update` atomically.
    pub fn apply(&self, update: CredentialUpdate) -> StoreResult<()> {
        let _gate = self.write_gate();
        self.commit(&update)
    }

    /// Runs a read-check-write cycle under the write gate.
    ///
    /// `f` sees the current record and returns a value plus the update to
    /// commit. No other reader or writer runs between the read and the
    /// commit. If `f` fails nothing is written.
    pub fn modify<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&CredentialRecord) -> Result<(T, CredentialUpdate), E>,
        E: From<StoreError>,
    {
        let _gate = self.write_gate();
        let current = self.load_record();
        let (out, update) = f(&current)?;
        self.commit(&update)?;
        Ok(out)
    }

    // ── typed accessors ──────────────────────────────────────────

    pub fn license_key(&self) -> Option<String> {
        self.get(Field::LicenseKey)
    }

    pub fn set_license_key(&self, value: &str) -> StoreResult<()> {
        self.set(Field::LicenseKey, value)
    }

    pub fn bound_fingerprint(&self) -> Option<String> {
        self.get(Field::BoundFingerprint)
    }

    pub fn set_bound_fingerprint(&self, value: &str) -> StoreResult<()> {
        self.set(Field::BoundFingerprint, value)
    }

    pub fn session_token(&self) -> Option<String> {
        self.get(Field::SessionToken)
    }

    pub fn set_session_token(&self, value: &str) -> StoreResult<()> {
        self.set(Field::SessionToken, value)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(Field::RefreshToken)
    }

    pub fn set_refresh_token(&self, value: &str) -> StoreResult<()> {
        self.set(Field::RefreshToken, value)
    }

    /// Token expiry in milliseconds since the Unix epoch.
    pub fn token_expiry(&self) -> Option<i64> {
        let _gate = self.read_gate();
        self.load_i64(Field::TokenExpiry)
    }

    pub fn set_token_expiry(&self, expiry_ms: i64) -> StoreResult<()> {
        self.apply(CredentialUpdate::new().set_i64(Field::TokenExpiry, expiry_ms))
    }

    pub fn registered_at(&self) -> Option<i64> {
        let _gate = self.read_gate();
        self.load_i64(Field::RegisteredAt)
    }

    pub fn language(&self) -> Option<String> {
        self.get(Field::Language)
    }

    pub fn set_language(&self, value: &str) -> StoreResult<()> {
        self.set(Field::Language, value)
    }

    pub fn remember_license(&self) -> bool {
        let _gate = self.read_gate();
        self.load_bool(Field::RememberLicense)
    }

    pub fn set_remember_license(&self, value: bool) -> StoreResult<()> {
        self.apply(CredentialUpdate::new().set_bool(Field::RememberLicense, value))
    }

    pub fn auto_login(&self) -> bool {
        let _gate = self.read_gate();
        self.load_bool(Field::AutoLogin)
    }

    pub fn set_auto_login(&self, value: bool) -> StoreResult<()> {
        self.apply(CredentialUpdate::new().set_bool(Field::AutoLogin, value))
    }

    /// True iff a fingerprint is bound and differs from `current`.
    pub fn has_fingerprint_changed(&self, current: &str) -> bool {
        self.record()
            .bound_fingerprint()
            .is_some_and(|bound| !bound.eq_ignore_ascii_case(current))
    }

    // ── scoped clears ────────────────────────────────────────────

    /// Erases every field, preferences included.
    pub fn clear_all(&self) -> StoreResult<()> {
        let _gate = self.write_gate();
        self.backend.apply(&[StorageOp::Clear])?;
        info!("All stored credentials and preferences cleared");
        Ok(())
    }

    /// Erases session token, refresh token and expiry. License binding and
    /// preferences stay.
    pub fn clear_session_and_refresh_token(&self) -> StoreResult<()> {
        self.apply(CredentialUpdate::new().remove_all(&Field::SESSION))?;
        info!("Session and refresh token cleared");
        Ok(())
    }

    /// Erases every authentication field. Preferences stay.
    pub fn clear_authentication_data(&self) -> StoreResult<()> {
        self.apply(CredentialUpdate::new().remove_all(&Field::AUTHENTICATION))?;
        info!("Authentication data cleared");
        Ok(())
    }
}
