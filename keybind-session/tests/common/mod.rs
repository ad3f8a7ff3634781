//! Shared test helpers for session tests.

#![allow(dead_code)]

use std::sync::Arc;

use keybind_crypto::MemoryKeystore;
use keybind_device::{DeviceAttributes, DeviceFingerprint};
use keybind_session::SessionManager;
use keybind_store::CredentialStore;

pub const NOW: i64 = 1_750_000_000_000;

pub fn device(model: &str) -> DeviceFingerprint {
    DeviceFingerprint::from_attributes(&DeviceAttributes {
        os_name: "android".into(),
        os_arch: "aarch64".into(),
        os_version: "14".into(),
        cpu_count: 8,
        board: "board".into(),
        brand: "brand".into(),
        device: "device".into(),
        hardware: "hardware".into(),
        model: model.into(),
        product: "product".into(),
    })
}

pub fn store() -> Arc<CredentialStore> {
    Arc::new(CredentialStore::open_in_memory(Arc::new(MemoryKeystore::new())).unwrap())
}

/// A manager acting for `device("phone")` over a fresh in-memory store.
pub fn manager() -> SessionManager {
    SessionManager::with_device(store(), device("phone"))
}
