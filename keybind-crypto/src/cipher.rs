//! Value encryption using ChaCha20-Poly1305.
//!
//! Provides authenticated encryption with associated data (AEAD). Stored
//! credentials are sealed with the name of the slot they live in as
//! associated data, so a ciphertext copied into another slot fails to open.

use crate::error::{CryptoError, CryptoResult};
use crate::key::MasterKey;
use base64::{Engine, engine::general_purpose::STANDARD};
use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use rand::RngCore;

/// Size of nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypted data with metadata needed for decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    /// The nonce used for encryption (unique per encryption).
    pub nonce: [u8; NONCE_SIZE],
    /// The encrypted ciphertext (includes auth tag).
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Returns the total size of the encrypted data.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    /// Returns true if the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Returns `nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Splits `nonce || ciphertext` back into its parts.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption("data too short".to_string()));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        let ciphertext = bytes[NONCE_SIZE..].to_vec();

        Ok(Self { nonce, ciphertext })
    }

    /// Encodes to base64 for storage.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decodes from base64.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::Decryption(format!("invalid base64: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

/// Encrypts plaintext using ChaCha20-Poly1305 with no associated data.
pub fn encrypt(key: &MasterKey, plaintext: &[u8]) -> CryptoResult<EncryptedData> {
    encrypt_with_aad(key, plaintext, &[])
}

/// Encrypts plaintext, authenticating `aad` alongside it.
///
/// The same `aad` must be presented to [`decrypt_with_aad`].
pub fn encrypt_with_aad(key: &MasterKey, plaintext: &[u8], aad: &[u8]) -> CryptoResult<EncryptedData> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, Payload { msg: plaintext, aad })
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedData {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypts ciphertext produced by [`encrypt`].
pub fn decrypt(key: &MasterKey, encrypted: &EncryptedData) -> CryptoResult<Vec<u8>> {
    decrypt_with_aad(key, encrypted, &[])
}

/// Decrypts ciphertext produced by [`encrypt_with_aad`].
///
/// Fails if the key, the associated data, or any ciphertext byte differs.
pub fn decrypt_with_aad(key: &MasterKey, encrypted: &EncryptedData, aad: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(&encrypted.nonce);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: encrypted.ciphertext.as_ref(),
                aad,
            },
        )
        .map_err(|_| {
            CryptoError::Decryption("decryption failed (wrong key or tampered data)".to_string())
        })
}

/// Encrypts a string and returns base64-encoded result.
pub fn encrypt_string(key: &MasterKey, plaintext: &str, aad: &[u8]) -> CryptoResult<String> {
    let encrypted = encrypt_with_aad(key, plaintext.as_bytes(), aad)?;
    Ok(encrypted.to_base64())
}

/// Decrypts a base64-encoded string.
pub fn decrypt_string(key: &MasterKey, encoded: &str, aad: &[u8]) -> CryptoResult<String> {
    let encrypted = EncryptedData::from_base64(encoded)?;
    let plaintext = decrypt_with_aad(key, &encrypted, aad)?;
    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {}", e)))
}
