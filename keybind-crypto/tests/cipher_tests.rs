use keybind_crypto::{
    decrypt, decrypt_string, decrypt_with_aad, encrypt, encrypt_string, encrypt_with_aad,
    generate_random_key, EncryptedData, NONCE_SIZE, TAG_SIZE,
};

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = generate_random_key();
    let plaintext = b"ABCD1234WXYZ5678";
    let encrypted = encrypt(&key, plaintext).unwrap();
    let decrypted = decrypt(&key, &encrypted).unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn encrypt_decrypt_empty() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"").unwrap();
    assert_eq!(encrypted.ciphertext.len(), TAG_SIZE);
    let decrypted = decrypt(&key, &encrypted).unwrap();
    assert_eq!(decrypted, b"");
}

#[test]
fn wrong_key_fails_decryption() {
    let key1 = generate_random_key();
    let key2 = generate_random_key();
    let encrypted = encrypt(&key1, b"session-token").unwrap();
    assert!(decrypt(&key2, &encrypted).is_err());
}

#[test]
fn tampered_data_fails_decryption() {
    let key = generate_random_key();
    let mut encrypted = encrypt(&key, b"session-token").unwrap();
    encrypted.ciphertext[0] ^= 0xFF;
    assert!(decrypt(&key, &encrypted).is_err());
}

#[test]
fn same_plaintext_produces_different_ciphertext() {
    let key = generate_random_key();
    let e1 = encrypt(&key, b"Same").unwrap();
    let e2 = encrypt(&key, b"Same").unwrap();
    assert_ne!(e1.nonce, e2.nonce);
    assert_ne!(e1.ciphertext, e2.ciphertext);
}

// ── Associated data ──────────────────────────────────────────────

#[test]
fn aad_roundtrip() {
    let key = generate_random_key();
    let encrypted = encrypt_with_aad(&key, b"tok1", b"session_token").unwrap();
    let decrypted = decrypt_with_aad(&key, &encrypted, b"session_token").unwrap();
    assert_eq!(decrypted, b"tok1");
}

#[test]
fn aad_mismatch_fails() {
    let key = generate_random_key();
    let encrypted = encrypt_with_aad(&key, b"tok1", b"session_token").unwrap();
    assert!(decrypt_with_aad(&key, &encrypted, b"refresh_token").is_err());
    assert!(decrypt(&key, &encrypted).is_err());
}

// ── EncryptedData ────────────────────────────────────────────────

#[test]
fn encrypted_data_len() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"test").unwrap();
    assert_eq!(encrypted.len(), NONCE_SIZE + encrypted.ciphertext.len());
}

#[test]
fn encrypted_data_is_empty() {
    let ed = EncryptedData {
        nonce: [0u8; NONCE_SIZE],
        ciphertext: vec![],
    };
    assert!(ed.is_empty());
}

#[test]
fn bytes_roundtrip() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"payload").unwrap();
    let parsed = EncryptedData::from_bytes(&encrypted.to_bytes()).unwrap();
    assert_eq!(parsed, encrypted);
}

#[test]
fn from_bytes_rejects_short_input() {
    assert!(EncryptedData::from_bytes(&[0u8; NONCE_SIZE + TAG_SIZE - 1]).is_err());
}

#[test]
fn from_base64_rejects_garbage() {
    assert!(EncryptedData::from_base64("!!not base64!!").is_err());
    assert!(EncryptedData::from_base64("c2hvcnQ=").is_err());
}

// ── String helpers ───────────────────────────────────────────────

#[test]
fn string_roundtrip() {
    let key = generate_random_key();
    let encoded = encrypt_string(&key, "ABCD1234WXYZ5678", b"license_key").unwrap();
    assert!(!encoded.contains("ABCD1234"));
    let decoded = decrypt_string(&key, &encoded, b"license_key").unwrap();
    assert_eq!(decoded, "ABCD1234WXYZ5678");
}

#[test]
fn string_roundtrip_unicode() {
    let key = generate_random_key();
    let encoded = encrypt_string(&key, "中文 🔑", b"language").unwrap();
    assert_eq!(decrypt_string(&key, &encoded, b"language").unwrap(), "中文 🔑");
}

#[test]
fn empty_string_roundtrip_is_not_absent() {
    let key = generate_random_key();
    let encoded = encrypt_string(&key, "", b"license_key").unwrap();
    assert!(!encoded.is_empty());
    assert_eq!(decrypt_string(&key, &encoded, b"license_key").unwrap(), "");
}
