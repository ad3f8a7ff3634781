//! Session lifecycle: login, logout and selective invalidation.
//!
//! ```text
//! LoggedOut --login--> LoggedIn(token valid | expired | unknown)
//! LoggedIn  --revoke_session_only--> LoggedIn(no token) --login--> LoggedIn(token)
//! any       --logout--> LoggedOut
//! ```

use crate::error::{SessionError, SessionResult};
use crate::mask::mask_license_key;
use crate::status::{evaluate, now_millis, ExpiryUrgency, SessionStatus};
use chrono::{DateTime, Utc};
use keybind_crypto::Keystore;
use keybind_device::DeviceFingerprint;
use keybind_store::{CredentialStore, CredentialUpdate, Field, StoreConfig};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Credentials handed over by the license-verification service.
#[derive(Clone)]
pub struct LoginRequest {
    pub license_key: String,
    pub session_token: String,
    pub refresh_token: Option<String>,
    /// Absolute expiry in milliseconds since the Unix epoch. `None` = unknown.
    pub expires_at_ms: Option<i64>,
    pub fingerprint: DeviceFingerprint,
}

impl LoginRequest {
    pub fn new(
        license_key: impl Into<String>,
        session_token: impl Into<String>,
        fingerprint: DeviceFingerprint,
    ) -> Self {
        Self {
            license_key: license_key.into(),
            session_token: session_token.into(),
            refresh_token: None,
            expires_at_ms: None,
            fingerprint,
        }
    }

    #[must_use]
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn expires_at(mut self, expires_at_ms: i64) -> Self {
        self.expires_at_ms = Some(expires_at_ms);
        self
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("license_key", &mask_license_key(&self.license_key))
            .field("session_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at_ms", &self.expires_at_ms)
            .field("fingerprint", &self.fingerprint.short())
            .finish()
    }
}

/// What a successful login did to the device binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginOutcome {
    /// No device was bound; this one now is.
    Bound,
    /// Same device as before; session replaced.
    Renewed,
    /// A different device was bound and has been replaced on request.
    Rebound,
}

/// A detectable problem with the stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "issue")]
pub enum SessionIssue {
    /// No license key stored.
    NoLicense,
    /// License bound but no session token.
    NoSessionToken,
    /// Session token stored without a license key.
    OrphanedToken,
    /// Token expiry has passed.
    Expired,
    /// Token has no usable expiry.
    UnknownExpiry,
    /// License stored without a bound device.
    NoBoundDevice,
    /// The bound device is not this device.
    FingerprintMismatch { bound: String, current: String },
    /// Automatic login is switched off in preferences.
    AutoLoginDisabled,
}

impl SessionIssue {
    /// True if the issue prevents using the session without user action.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Self::UnknownExpiry | Self::NoBoundDevice | Self::AutoLoginDisabled)
    }
}

impl fmt::Display for SessionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLicense => f.write_str("no license key is stored"),
            Self::NoSessionToken => f.write_str("license is bound but there is no session token"),
            Self::OrphanedToken => f.write_str("session token is stored without a license key"),
            Self::Expired => f.write_str("session token has expired"),
            Self::UnknownExpiry => f.write_str("session token expiry is unknown"),
            Self::NoBoundDevice => f.write_str("license is not bound to a device"),
            Self::FingerprintMismatch { bound, current } => {
                write!(f, "license is bound to device {bound}, this device is {current}")
            }
            Self::AutoLoginDisabled => f.write_str("automatic login is disabled"),
        }
    }
}

/// A redacted snapshot of the session, safe for UI and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub logged_in: bool,
    pub status: &'static str,
    pub remaining_ms: Option<i64>,
    pub remaining: Option<String>,
    pub urgency: Option<ExpiryUrgency>,
    pub license_key: Option<String>,
    pub bound_device: Option<String>,
    pub current_device: String,
    pub device_changed: bool,
    pub has_refresh_token: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub registered_at: Option<DateTime<Utc>>,
    pub storage_backend: &'static str,
    pub keystore: &'static str,
}

/// Drives login and invalidation over a shared [`CredentialStore`].
///
/// Holds no session state of its own; every query reads the store.
pub struct SessionManager {
    store: Arc<CredentialStore>,
    device: DeviceFingerprint,
}

impl SessionManager {
    /// Manages `store` on behalf of the current device.
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self::with_device(store, DeviceFingerprint::generate())
    }

    /// Manages `store` on behalf of `device` instead of the computed one.
    pub fn with_device(store: Arc<CredentialStore>, device: DeviceFingerprint) -> Self {
        Self { store, device }
    }

    /// Opens the store described by `config`.
    ///
    /// Fails with [`SessionError::ConfigurationFatal`] if the keystore cannot
    /// provide the master key.
    pub fn open(config: &StoreConfig, keystore: Arc<dyn Keystore>) -> SessionResult<Self> {
        let store = CredentialStore::open(config, keystore)?;
        Ok(Self::new(Arc::new(store)))
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Fingerprint of the device this manager acts for.
    pub fn device(&self) -> &DeviceFingerprint {
        &self.device
    }

    /// Stores a new session and binds it to `request.fingerprint`.
    ///
    /// If another device is already bound, fails with
    /// [`SessionError::BindConflict`] and writes nothing, unless `rebind`.
    pub fn login(&self, request: &LoginRequest, rebind: bool) -> SessionResult<LoginOutcome> {
        if request.license_key.is_empty() {
            return Err(SessionError::InvalidCredentials("license key is empty".into()));
        }
        if request.session_token.is_empty() {
            return Err(SessionError::InvalidCredentials("session token is empty".into()));
        }

        let presented = request.fingerprint.id();
        let outcome = self.store.modify(|current| {
            let outcome = match current.bound_fingerprint() {
                None => LoginOutcome::Bound,
                Some(bound) if bound.eq_ignore_ascii_case(presented) => LoginOutcome::Renewed,
                Some(bound) if rebind => {
                    info!(
                        bound = %short(bound),
                        presented = %request.fingerprint.short(),
                        "Re-binding license to new device"
                    );
                    LoginOutcome::Rebound
                }
                Some(bound) => {
                    return Err(SessionError::BindConflict {
                        bound: bound.to_string(),
                        presented: presented.to_string(),
                    });
                }
            };

            let mut update = CredentialUpdate::new()
                .set(Field::LicenseKey, request.license_key.as_str())
                .set(Field::BoundFingerprint, presented)
                .set(Field::SessionToken, request.session_token.as_str());
            update = match &request.refresh_token {
                Some(token) => update.set(Field::RefreshToken, token.as_str()),
                None => update.remove(Field::RefreshToken),
            };
            update = match request.expires_at_ms {
                Some(ms) => update.set_i64(Field::TokenExpiry, ms),
                None => update.remove(Field::TokenExpiry),
            };
            if outcome != LoginOutcome::Renewed || current.registered_at.is_none() {
                update = update.set_i64(Field::RegisteredAt, now_millis());
            }
            Ok((outcome, update))
        })?;

        info!(
            license = %mask_license_key(&request.license_key),
            device = %request.fingerprint.short(),
            ?outcome,
            "Logged in"
        );
        Ok(outcome)
    }

    /// Erases everything, preferences included.
    pub fn logout(&self) -> SessionResult<()> {
        self.store.clear_all()?;
        info!("Logged out");
        Ok(())
    }

    /// Drops the session and refresh token but keeps the license binding.
    pub fn revoke_session_only(&self) -> SessionResult<()> {
        self.store.clear_session_and_refresh_token()?;
        info!("Session revoked, license binding kept");
        Ok(())
    }

    /// Drops every authentication field but keeps preferences.
    pub fn clear_authentication_data(&self) -> SessionResult<()> {
        self.store.clear_authentication_data()?;
        Ok(())
    }

    /// True iff a non-empty license key is stored.
    ///
    /// Says nothing about token freshness; use [`Self::status`] for that.
    pub fn is_logged_in(&self) -> bool {
        self.store.record().has_license()
    }

    pub fn status(&self) -> SessionStatus {
        self.status_at(now_millis())
    }

    pub fn status_at(&self, now_ms: i64) -> SessionStatus {
        evaluate(&self.store.record(), now_ms)
    }

    /// True iff a device is bound and it is not this one.
    pub fn has_device_changed(&self) -> bool {
        self.store.has_fingerprint_changed(self.device.id())
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary_at(now_millis())
    }

    pub fn summary_at(&self, now_ms: i64) -> SessionSummary {
        let record = self.store.record();
        let status = evaluate(&record, now_ms);
        let info = self.store.storage_info();
        let bound = record.bound_fingerprint();

        SessionSummary {
            logged_in: record.has_license(),
            status: status.label(),
            remaining_ms: status.remaining().map(|d| d.num_milliseconds()),
            remaining: status.remaining_time().map(|t| t.to_string()),
            urgency: status.urgency(),
            license_key: record
                .license_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .map(mask_license_key),
            bound_device: bound.map(|b| short(b).to_string()),
            current_device: self.device.short().to_string(),
            device_changed: bound.is_some_and(|b| !b.eq_ignore_ascii_case(self.device.id())),
            has_refresh_token: record.refresh_token.as_deref().is_some_and(|t| !t.is_empty()),
            expires_at: record
                .token_expiry
                .filter(|ms| *ms > 0)
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            registered_at: record.registered_at.and_then(DateTime::<Utc>::from_timestamp_millis),
            storage_backend: info.backend,
            keystore: info.keystore,
        }
    }

    pub fn diagnose(&self) -> Vec<SessionIssue> {
        self.diagnose_at(now_millis())
    }

    /// Lists every detectable problem with the stored session at `now_ms`.
    pub fn diagnose_at(&self, now_ms: i64) -> Vec<SessionIssue> {
        let record = self.store.record();
        let mut issues = Vec::new();

        if record.is_orphaned() {
            issues.push(SessionIssue::OrphanedToken);
        } else if !record.has_license() {
            issues.push(SessionIssue::NoLicense);
        } else if !record.has_session_token() {
            issues.push(SessionIssue::NoSessionToken);
        }

        match evaluate(&record, now_ms) {
            SessionStatus::Expired => issues.push(SessionIssue::Expired),
            SessionStatus::Unknown => issues.push(SessionIssue::UnknownExpiry),
            SessionStatus::NotAuthenticated | SessionStatus::Valid { .. } => {}
        }

        if record.has_license() {
            match record.bound_fingerprint() {
                None => issues.push(SessionIssue::NoBoundDevice),
                Some(bound) if !bound.eq_ignore_ascii_case(self.device.id()) => {
                    issues.push(SessionIssue::FingerprintMismatch {
                        bound: bound.to_string(),
                        current: self.device.id().to_string(),
                    });
                }
                Some(_) => {}
            }
            if !self.store.auto_login() {
                issues.push(SessionIssue::AutoLoginDisabled);
            }
        }

        debug!(count = issues.len(), "Session diagnosed");
        issues
    }
}

/// First eight characters of a stored fingerprint, for logs.
fn short(fingerprint: &str) -> &str {
    fingerprint.get(..8).unwrap_or(fingerprint)
}
