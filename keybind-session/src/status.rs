//! Session state evaluation.
//!
//! [`evaluate`] is a pure function of the stored record and a timestamp.
//! Rules, first match wins:
//!
//! 1. No license key or no session token (absent or empty) → `NotAuthenticated`
//! 2. Expiry absent or not positive → `Unknown`
//! 3. Expiry at or before `now` → `Expired`
//! 4. Otherwise → `Valid(expiry - now)`

use chrono::{Duration, Utc};
use keybind_store::CredentialRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// The state of the stored session at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No usable session: token or license missing, or the token is orphaned.
    NotAuthenticated,
    /// Token is live for `remaining` more.
    Valid { remaining: Duration },
    /// Token expiry has passed.
    Expired,
    /// A token exists but its expiry is not known.
    Unknown,
}

impl SessionStatus {
    /// Returns true only for a token known to be live.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Returns true if a bound token exists, whatever its freshness.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !matches!(self, Self::NotAuthenticated)
    }

    /// Raw remaining duration for `Valid`, `None` otherwise.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Self::Valid { remaining } => Some(*remaining),
            _ => None,
        }
    }

    #[must_use]
    pub fn remaining_time(&self) -> Option<RemainingTime> {
        self.remaining().map(RemainingTime::from_duration)
    }

    #[must_use]
    pub fn urgency(&self) -> Option<ExpiryUrgency> {
        self.remaining().map(ExpiryUrgency::from_remaining)
    }

    /// Stable lowercase name, used in summaries and CLI output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::Valid { .. } => "valid",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => f.write_str("not authenticated"),
            Self::Valid { remaining } => {
                write!(f, "valid ({} left)", RemainingTime::from_duration(*remaining))
            }
            Self::Expired => f.write_str("expired"),
            Self::Unknown => f.write_str("unknown expiry"),
        }
    }
}

/// Evaluates `record` at `now_ms` (milliseconds since the Unix epoch).
pub fn evaluate(record: &CredentialRecord, now_ms: i64) -> SessionStatus {
    if !record.has_session_token() || !record.has_license() {
        return SessionStatus::NotAuthenticated;
    }
    let expiry = match record.token_expiry {
        Some(ms) if ms > 0 => ms,
        _ => return SessionStatus::Unknown,
    };
    if expiry <= now_ms {
        return SessionStatus::Expired;
    }
    SessionStatus::Valid {
        remaining: Duration::milliseconds(expiry.saturating_sub(now_ms)),
    }
}

/// Evaluates `record` against the current wall clock.
pub fn evaluate_now(record: &CredentialRecord) -> SessionStatus {
    evaluate(record, now_millis())
}

/// A remaining duration broken into calendar-free units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTime {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl RemainingTime {
    /// Splits `d` into units. Negative durations clamp to zero.
    #[must_use]
    pub fn from_duration(d: Duration) -> Self {
        let total = d.num_seconds().max(0);
        Self {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}d {}h", self.days, self.hours)
        } else if self.hours > 0 {
            write!(f, "{}h {}m", self.hours, self.minutes)
        } else {
            write!(f, "{}m", self.minutes)
        }
    }
}

/// How soon a valid token runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryUrgency {
    /// A day or more left.
    Normal,
    /// Less than a day left.
    Warning,
    /// Less than an hour left.
    Critical,
}

impl ExpiryUrgency {
    #[must_use]
    pub fn from_remaining(remaining: Duration) -> Self {
        if remaining < Duration::hours(1) {
            Self::Critical
        } else if remaining < Duration::days(1) {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}
