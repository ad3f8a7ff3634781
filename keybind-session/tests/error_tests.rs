use keybind_crypto::CryptoError;
use keybind_session::SessionError;
use keybind_store::StoreError;

#[test]
fn key_unavailable_maps_to_configuration_fatal() {
    let err: SessionError = StoreError::KeyUnavailable(CryptoError::KeyUnavailable {
        alias: "keybind_master_key".into(),
        reason: "locked".into(),
    })
    .into();
    assert!(matches!(err, SessionError::ConfigurationFatal(_)));
    assert!(!err.is_recoverable());
    assert!(format!("{err}").contains("unavailable"));
}

#[test]
fn other_store_errors_map_to_storage() {
    let err: SessionError = StoreError::Corrupt {
        key: "session_token".into(),
        reason: "bad tag".into(),
    }
    .into();
    assert!(matches!(err, SessionError::Storage(_)));
}

#[test]
fn bind_conflict_display_names_both_devices() {
    let err = SessionError::BindConflict {
        bound: "AAAA".into(),
        presented: "BBBB".into(),
    };
    let msg = format!("{err}");
    assert!(msg.contains("AAAA"));
    assert!(msg.contains("BBBB"));
    assert!(err.is_recoverable());
}

#[test]
fn invalid_credentials_display() {
    let err = SessionError::InvalidCredentials("license key is empty".into());
    assert!(format!("{err}").contains("license key is empty"));
    assert!(err.is_recoverable());
}
