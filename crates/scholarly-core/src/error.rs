// ── Core error types ──
//
// User-facing errors from scholarly-core. Consumers never see raw
// serde or IO failures from a store backend directly; they arrive
// wrapped with the key that was being read or written.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage errors ───────────────────────────────────────────────
    #[error("Storage error on key '{key}': {message}")]
    Storage { key: String, message: String },

    #[error("Failed to serialize value for key '{key}': {message}")]
    Serialization { key: String, message: String },

    // ── Validation errors ────────────────────────────────────────────
    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Payment request errors ───────────────────────────────────────
    #[error("Payment request not found for token {token}")]
    PaymentRequestNotFound { token: String },

    #[error("Payment request {token} expired at {expired_at}")]
    PaymentRequestExpired { token: String, expired_at: String },

    #[error("Payment request {token} has already been completed")]
    PaymentRequestCompleted { token: String },

    // ── Account errors ───────────────────────────────────────────────
    #[error("Parent account not found: {identifier}")]
    ParentAccountNotFound { identifier: String },

    #[error("A parent account already exists for {email}")]
    ParentAccountExists { email: String },

    #[error("Account type '{account_type}' allows at most {max_students} linked students")]
    StudentLimitReached {
        account_type: String,
        max_students: u32,
    },

    #[error("Cannot change account type from '{from}' to '{to}'")]
    InvalidUpgrade { from: String, to: String },

    #[error("Child profile not found: {identifier}")]
    ChildNotFound { identifier: String },

    #[error("Invitation {token} is not valid")]
    InvitationInvalid { token: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn storage(key: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage {
            key: key.to_owned(),
            message: err.to_string(),
        }
    }

    pub(crate) fn serialization(key: &str, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            key: key.to_owned(),
            message: err.to_string(),
        }
    }
}
