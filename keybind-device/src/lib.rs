//! Device fingerprinting for license binding.
//!
//! Generates a stable hardware fingerprint that identifies this device.
//! Used to bind a license to one device and to detect when the stored
//! credentials were moved to another one.
//!
//! # Properties
//!
//! - **Deterministic**: identical attributes always give an identical fingerprint
//! - **Reinstall-stable**: only OS and hardware attributes are used, never
//!   app-generated IDs
//! - **Total**: missing attributes become empty strings instead of failing

mod attributes;
mod fingerprint;

pub use attributes::DeviceAttributes;
pub use fingerprint::{DeviceFingerprint, FINGERPRINT_BYTES, FINGERPRINT_HEX_LEN};
