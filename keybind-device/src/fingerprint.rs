//! Device fingerprint derivation.
//!
//! The fingerprint is an identification value, not a security boundary: it
//! only needs to tell devices apart and stay stable on one device. SHA-256
//! is truncated to 128 bits, so collision resistance is that of a 128-bit
//! digest. A determined attacker who can read the attributes of another
//! device can reproduce its fingerprint.

use crate::attributes::DeviceAttributes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Fingerprint length in bytes (128 bits).
pub const FINGERPRINT_BYTES: usize = 16;

/// Fingerprint length as uppercase hex.
pub const FINGERPRINT_HEX_LEN: usize = FINGERPRINT_BYTES * 2;

/// Domain salt prepended to the attribute string before hashing.
const FINGERPRINT_SALT: &[u8] = b"keybind.device-fingerprint.v1";

/// Attribute separator. Keeps `("ab", "c")` and `("a", "bc")` distinct.
const SEPARATOR: &str = "|";

/// A stable 128-bit identifier for this device, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceFingerprint {
    id: String,
}

impl DeviceFingerprint {
    /// Generates the fingerprint for the current device.
    ///
    /// Recomputed on every call; nothing is cached.
    #[must_use]
    pub fn generate() -> Self {
        let attributes = DeviceAttributes::collect();
        if attributes.hardware_fields_present() == 0 {
            tracing::debug!("No hardware identifiers available, fingerprint uses OS attributes only");
        }
        Self::from_attributes(&attributes)
    }

    /// Derives the fingerprint from explicit attributes.
    #[must_use]
    pub fn from_attributes(attributes: &DeviceAttributes) -> Self {
        let combined = attributes.components().join(SEPARATOR);

        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_SALT);
        hasher.update(combined.as_bytes());
        let hash = hasher.finalize();

        Self {
            id: hex::encode_upper(&hash[..FINGERPRINT_BYTES]),
        }
    }

    /// Parses a previously stored fingerprint (32 hex characters).
    ///
    /// Lowercase input is accepted and normalized to uppercase.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.len() != FINGERPRINT_HEX_LEN || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self {
            id: value.to_ascii_uppercase(),
        })
    }

    /// Returns the fingerprint as uppercase hex.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the raw 16 bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; FINGERPRINT_BYTES] {
        let mut out = [0u8; FINGERPRINT_BYTES];
        // `id` is validated hex of the right length at construction.
        if hex::decode_to_slice(&self.id, &mut out).is_err() {
            out = [0u8; FINGERPRINT_BYTES];
        }
        out
    }

    /// First 8 characters, for log lines.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.id[..8]
    }

    /// Validates that this fingerprint matches the current device.
    #[must_use]
    pub fn matches_current(&self) -> bool {
        self.id == Self::generate().id
    }
}

impl fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl TryFrom<String> for DeviceFingerprint {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid device fingerprint: {value:?}"))
    }
}

impl From<DeviceFingerprint> for String {
    fn from(fp: DeviceFingerprint) -> Self {
        fp.id
    }
}
