//! Encrypted credential storage for keybind.
//!
//! Persists the license key, the bound device fingerprint, the session and
//! refresh tokens with their expiry, and a few application preferences.
//!
//! # Architecture
//!
//! - [`SecureStorage`] is the durable key-value backend (SQLite by default)
//! - [`CredentialStore`] encrypts every value through a
//!   [`keybind_crypto::Keystore`] and serializes writers
//! - Three scoped clears remove everything, only the session, or only
//!   authentication data
//!
//! The store is constructed explicitly and shared as `Arc<CredentialStore>`;
//! there is no global instance.

mod backend;
mod config;
mod error;
mod record;
mod store;

pub use backend::{SecureStorage, SqliteStorage, StorageOp};
pub use config::{StoreConfig, DEFAULT_DB_FILE, DEFAULT_KEY_ALIAS};
pub use error::{StoreError, StoreResult};
pub use record::{CredentialRecord, CredentialUpdate, Field, Preferences};
pub use store::{CredentialStore, StorageInfo};
