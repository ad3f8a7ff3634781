use std::sync::Arc;

use keybind_crypto::{
    generate_random_key, CryptoError, KdfParams, Keystore, MemoryKeystore, PassphraseKeystore,
    Salt,
};

const ALIAS: &str = "keybind_master_key";

fn fast_passphrase_keystore(passphrase: &str, salt: &Salt) -> PassphraseKeystore {
    let params = KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    };
    PassphraseKeystore::with_params(passphrase, salt, &params).unwrap()
}

// ── MemoryKeystore ───────────────────────────────────────────────

#[test]
fn memory_keystore_requires_ensure_key() {
    let ks = MemoryKeystore::new();
    let err = ks.encrypt(ALIAS, b"data", b"").unwrap_err();
    assert!(matches!(err, CryptoError::KeyUnavailable { .. }));
}

#[test]
fn memory_keystore_roundtrip() {
    let ks = MemoryKeystore::new();
    ks.ensure_key(ALIAS).unwrap();
    let sealed = ks.encrypt(ALIAS, b"tok1", b"session_token").unwrap();
    assert_eq!(ks.decrypt(ALIAS, &sealed, b"session_token").unwrap(), b"tok1");
}

#[test]
fn memory_keystore_ensure_key_is_idempotent() {
    let ks = MemoryKeystore::new();
    ks.ensure_key(ALIAS).unwrap();
    let sealed = ks.encrypt(ALIAS, b"v", b"").unwrap();
    ks.ensure_key(ALIAS).unwrap();
    assert_eq!(ks.decrypt(ALIAS, &sealed, b"").unwrap(), b"v");
}

#[test]
fn memory_keystore_aliases_are_independent() {
    let ks = MemoryKeystore::new();
    ks.ensure_key("a").unwrap();
    ks.ensure_key("b").unwrap();
    let sealed = ks.encrypt("a", b"v", b"").unwrap();
    assert!(ks.decrypt("b", &sealed, b"").is_err());
}

#[test]
fn memory_keystore_delete_key_makes_data_unreadable() {
    let ks = MemoryKeystore::new();
    ks.ensure_key(ALIAS).unwrap();
    let sealed = ks.encrypt(ALIAS, b"v", b"").unwrap();
    ks.delete_key(ALIAS).unwrap();
    assert!(ks.decrypt(ALIAS, &sealed, b"").is_err());
}

#[test]
fn memory_keystore_with_shared_key() {
    let key = generate_random_key();
    let a = MemoryKeystore::with_key(ALIAS, key.clone());
    let b = MemoryKeystore::with_key(ALIAS, key);
    let sealed = a.encrypt(ALIAS, b"shared", b"").unwrap();
    assert_eq!(b.decrypt(ALIAS, &sealed, b"").unwrap(), b"shared");
}

#[test]
fn memory_keystore_rejects_truncated_blob() {
    let ks = MemoryKeystore::new();
    ks.ensure_key(ALIAS).unwrap();
    assert!(ks.decrypt(ALIAS, &[1, 2, 3], b"").is_err());
}

#[test]
fn keystore_as_dyn_trait() {
    let ks: Arc<dyn Keystore> = Arc::new(MemoryKeystore::new());
    assert_eq!(ks.kind(), "memory");
    ks.ensure_key(ALIAS).unwrap();
    let sealed = ks.encrypt(ALIAS, b"dyn", b"").unwrap();
    assert_eq!(ks.decrypt(ALIAS, &sealed, b"").unwrap(), b"dyn");
}

// ── PassphraseKeystore ───────────────────────────────────────────

#[test]
fn passphrase_keystore_is_reproducible() {
    let salt = Salt::from_bytes([3; 16]);
    let a = fast_passphrase_keystore("correct horse", &salt);
    let b = fast_passphrase_keystore("correct horse", &salt);
    let sealed = a.encrypt(ALIAS, b"license", b"license_key").unwrap();
    assert_eq!(b.decrypt(ALIAS, &sealed, b"license_key").unwrap(), b"license");
}

#[test]
fn passphrase_keystore_wrong_passphrase_fails() {
    let salt = Salt::from_bytes([3; 16]);
    let a = fast_passphrase_keystore("correct horse", &salt);
    let b = fast_passphrase_keystore("battery staple", &salt);
    let sealed = a.encrypt(ALIAS, b"license", b"").unwrap();
    assert!(b.decrypt(ALIAS, &sealed, b"").is_err());
}

#[test]
fn passphrase_keystore_rejects_empty_passphrase() {
    let result = PassphraseKeystore::with_params(
        "",
        &Salt::random(),
        &KdfParams {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        },
    );
    assert!(matches!(result, Err(CryptoError::KeyDerivation(_))));
}

#[test]
fn passphrase_keystore_ensure_key_always_succeeds() {
    let ks = fast_passphrase_keystore("pw", &Salt::random());
    assert_eq!(ks.kind(), "passphrase");
    ks.ensure_key("anything").unwrap();
    ks.delete_key("anything").unwrap();
}
