//! At-rest encryption for keybind credentials.
//!
//! Provides:
//! - ChaCha20-Poly1305 authenticated encryption of individual values
//! - Master key handling (random or Argon2id-derived, zeroized on drop)
//! - The [`Keystore`] trait the credential store seals values through
//!
//! # Key Architecture
//!
//! A single master key per alias lives in the keystore. Each stored value
//! is encrypted with a fresh nonce and authenticated together with the
//! name of the slot it is stored in.

mod cipher;
mod error;
mod key;
mod keystore;
mod os_keyring;

pub use cipher::{
    decrypt, decrypt_string, decrypt_with_aad, encrypt, encrypt_string, encrypt_with_aad,
    EncryptedData, NONCE_SIZE, TAG_SIZE,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, generate_random_key, KdfParams, MasterKey, Salt, KEY_SIZE, SALT_SIZE};
pub use keystore::{Keystore, MemoryKeystore, PassphraseKeystore};
pub use os_keyring::KeyringKeystore;
