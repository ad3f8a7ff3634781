//! Error types for the credential store.

use keybind_crypto::CryptoError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error (creating the data directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The keystore cannot provide the master key. The store cannot operate.
    #[error("encryption key unavailable: {0}")]
    KeyUnavailable(#[source] CryptoError),

    /// Encrypting a value for storage failed.
    #[error("encryption error: {0}")]
    Encryption(#[source] CryptoError),

    /// A stored value cannot be decoded or decrypted.
    ///
    /// Only produced internally; read accessors report the field as absent.
    #[error("stored value for '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}
