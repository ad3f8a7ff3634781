//! Stored fields and the credential record snapshot.

use std::fmt;

/// Every slot the credential store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    LicenseKey,
    BoundFingerprint,
    SessionToken,
    RefreshToken,
    /// Absolute token expiry, milliseconds since the Unix epoch.
    TokenExpiry,
    /// When the device was first bound, milliseconds since the Unix epoch.
    RegisteredAt,
    Language,
    RememberLicense,
    AutoLogin,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::LicenseKey,
        Field::BoundFingerprint,
        Field::SessionToken,
        Field::RefreshToken,
        Field::TokenExpiry,
        Field::RegisteredAt,
        Field::Language,
        Field::RememberLicense,
        Field::AutoLogin,
    ];

    /// Fields removed when only the session is revoked.
    pub const SESSION: [Field; 3] = [Field::SessionToken, Field::RefreshToken, Field::TokenExpiry];

    /// Fields removed when authentication data is cleared.
    pub const AUTHENTICATION: [Field; 6] = [
        Field::LicenseKey,
        Field::BoundFingerprint,
        Field::SessionToken,
        Field::RefreshToken,
        Field::TokenExpiry,
        Field::RegisteredAt,
    ];

    /// Application preferences unrelated to authentication.
    pub const PREFERENCES: [Field; 3] = [Field::Language, Field::RememberLicense, Field::AutoLogin];

    /// Storage key. Also used as associated data when the value is encrypted.
    pub const fn key(self) -> &'static str {
        match self {
            Field::LicenseKey => "license_key",
            Field::BoundFingerprint => "bound_fingerprint",
            Field::SessionToken => "session_token",
            Field::RefreshToken => "refresh_token",
            Field::TokenExpiry => "token_expiry",
            Field::RegisteredAt => "registered_at",
            Field::Language => "language",
            Field::RememberLicense => "remember_license",
            Field::AutoLogin => "auto_login",
        }
    }

    pub fn is_preference(self) -> bool {
        Self::PREFERENCES.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A consistent snapshot of all authentication fields.
///
/// `None` means the field is absent; `Some("")` is a stored empty string.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialRecord {
    pub license_key: Option<String>,
    pub bound_fingerprint: Option<String>,
    pub session_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expiry: Option<i64>,
    pub registered_at: Option<i64>,
}

impl CredentialRecord {
    /// True iff a non-empty license key is stored.
    pub fn has_license(&self) -> bool {
        non_empty(&self.license_key)
    }

    /// True iff a non-empty session token is stored.
    pub fn has_session_token(&self) -> bool {
        non_empty(&self.session_token)
    }

    /// A session token without a license key. Readers treat it as logged out.
    pub fn is_orphaned(&self) -> bool {
        self.has_session_token() && !self.has_license()
    }

    /// The bound fingerprint, treating an empty string as absent.
    pub fn bound_fingerprint(&self) -> Option<&str> {
        self.bound_fingerprint.as_deref().filter(|s| !s.is_empty())
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

fn presence(value: &Option<String>) -> &'static str {
    match value.as_deref() {
        None => "absent",
        Some("") => "empty",
        Some(_) => "[REDACTED]",
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("license_key", &presence(&self.license_key))
            .field("bound_fingerprint", &self.bound_fingerprint)
            .field("session_token", &presence(&self.session_token))
            .field("refresh_token", &presence(&self.refresh_token))
            .field("token_expiry", &self.token_expiry)
            .field("registered_at", &self.registered_at)
            .finish()
    }
}

/// Application preferences stored next to the credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub language: Option<String>,
    pub remember_license: bool,
    pub auto_login: bool,
}

/// A batch of field changes committed atomically by
/// [`crate::CredentialStore::apply`] or [`crate::CredentialStore::modify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialUpdate {
    pub(crate) changes: Vec<(Field, Option<String>)>,
}

impl CredentialUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, field: Field, value: impl Into<String>) -> Self {
        self.changes.push((field, Some(value.into())));
        self
    }

    #[must_use]
    pub fn set_i64(self, field: Field, value: i64) -> Self {
        self.set(field, value.to_string())
    }

    #[must_use]
    pub fn set_bool(self, field: Field, value: bool) -> Self {
        self.set(field, if value { "true" } else { "false" })
    }

    #[must_use]
    pub fn remove(mut self, field: Field) -> Self {
        self.changes.push((field, None));
        self
    }

    #[must_use]
    pub fn remove_all(mut self, fields: &[Field]) -> Self {
        self.changes.extend(fields.iter().map(|f| (*f, None)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Fields touched by this update, in order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.changes.iter().map(|(f, _)| *f)
    }
}
