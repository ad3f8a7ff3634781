//! Key material and derivation.
//!
//! Master keys are either random (held by the platform keystore) or
//! derived from a passphrase with Argon2id for hosts without one.

use crate::error::{CryptoError, CryptoResult};
use argon2::{Argon2, Params, Version};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of encryption keys in bytes (256 bits for ChaCha20).
pub const KEY_SIZE: usize = 32;

/// Size of salt in bytes.
pub const SALT_SIZE: usize = 16;

/// A 256-bit master key, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_SIZE],
}

impl MasterKey {
    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Encodes the key for storage in a secret store that only holds text.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    /// Decodes a key written by [`MasterKey::to_base64`].
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let mut decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?;

        if decoded.len() != KEY_SIZE {
            let actual = decoded.len();
            decoded.zeroize();
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual,
            });
        }

        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { bytes })
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Salt for key derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt {
    bytes: [u8; SALT_SIZE],
}

impl Salt {
    /// Generates a random salt.
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a salt from raw bytes.
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.bytes
    }
}

/// Key derivation parameters.
#[derive(Clone, Debug)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // OWASP recommendations for Argon2id (2023)
        Self {
            memory_cost: 19 * 1024, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// Derives a master key from a passphrase using Argon2id.
pub fn derive_key(passphrase: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<MasterKey> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key_bytes = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt.as_bytes(), &mut key_bytes)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let key = MasterKey::from_bytes(key_bytes);
    key_bytes.zeroize();
    Ok(key)
}

/// Generates a random master key.
pub fn generate_random_key() -> MasterKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let key = MasterKey::from_bytes(bytes);
    bytes.zeroize();
    key
}
