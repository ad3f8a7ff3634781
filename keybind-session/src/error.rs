//! Error types for session management.

use keybind_store::StoreError;
use thiserror::Error;

/// Session-specific errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The keystore cannot provide the master key. The subsystem cannot start.
    #[error("credential storage unavailable: {0}")]
    ConfigurationFatal(String),

    /// Login presented a different device than the one already bound.
    #[error("license is bound to device {bound}, login presented {presented}")]
    BindConflict { bound: String, presented: String },

    /// Login was called with unusable credentials.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Storage write failed.
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::KeyUnavailable(e) => Self::ConfigurationFatal(e.to_string()),
            other => Self::Storage(other),
        }
    }
}

impl SessionError {
    /// True for errors the caller can resolve (re-bind, re-enter credentials).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::BindConflict { .. } | Self::InvalidCredentials(_))
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
