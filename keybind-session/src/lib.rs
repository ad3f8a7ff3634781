//! Session state and lifecycle for keybind.
//!
//! This crate handles:
//! - Evaluating a stored credential record against the wall clock
//! - Binding a license and session to a device fingerprint
//! - Logout, session revocation and authentication-data clears
//! - Redacted summaries and diagnostics for UI and logs
//!
//! # Design Principles
//!
//! - **Computed, never cached**: [`SessionStatus`] is derived from the record
//!   and the current time on every query
//! - **Fails closed**: orphaned, corrupt or unreadable state reads as
//!   [`SessionStatus::NotAuthenticated`]
//! - **Device binding**: a second login from another device is a
//!   [`SessionError::BindConflict`] unless a re-bind is requested

mod error;
mod manager;
mod mask;
mod status;

pub use error::{SessionError, SessionResult};
pub use manager::{LoginOutcome, LoginRequest, SessionIssue, SessionManager, SessionSummary};
pub use mask::mask_license_key;
pub use status::{evaluate, evaluate_now, now_millis, ExpiryUrgency, RemainingTime, SessionStatus};
