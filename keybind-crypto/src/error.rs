//! Error types for at-rest encryption and keystore access.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Argon2 rejected the passphrase or parameters.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Wrong key, wrong associated data, or tampered ciphertext.
    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Key material read back from a keystore is not valid base64.
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// The keystore has no key for the alias and cannot create one.
    #[error("keystore key unavailable for alias '{alias}': {reason}")]
    KeyUnavailable { alias: String, reason: String },
}
