//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use scholarly_config::ConfigError;
use scholarly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const STORAGE: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const LIMIT: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const EXPIRED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Records ──────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(scholarly::not_found),
        help("Run: scholarly {list_command} to see existing {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(scholarly::conflict))]
    Conflict { message: String },

    #[error("Payment request {token} expired at {expired_at}")]
    #[diagnostic(
        code(scholarly::expired),
        help("Ask the student to send a new request: scholarly requests create")
    )]
    Expired { token: String, expired_at: String },

    // ── Parent accounts ──────────────────────────────────────────────
    #[error("A '{account_type}' account can link at most {max_students} student(s)")]
    #[diagnostic(
        code(scholarly::student_limit),
        help("Upgrade the account: scholarly parents upgrade <account> --to parent-paid")
    )]
    StudentLimit {
        account_type: String,
        max_students: u32,
    },

    #[error("Cannot move a '{from}' account to '{to}'")]
    #[diagnostic(
        code(scholarly::invalid_upgrade),
        help("Run: scholarly parents options <email> to see the allowed upgrades")
    )]
    InvalidUpgrade { from: String, to: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(scholarly::validation))]
    Validation { field: String, reason: String },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Storage error on '{key}': {message}")]
    #[diagnostic(
        code(scholarly::storage),
        help("Check the data directory (--data-dir) is writable and its files are valid JSON.")
    )]
    Storage { key: String, message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(scholarly::config),
        help("Inspect the resolved settings with: scholarly config show")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(scholarly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("{what} is required")]
    #[diagnostic(
        code(scholarly::missing_input),
        help("Pass {flag} or run in an interactive terminal to be prompted.")
    )]
    MissingInput { what: String, flag: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(scholarly::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(scholarly::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Expired { .. } => exit_code::EXPIRED,
            Self::StudentLimit { .. } | Self::InvalidUpgrade { .. } => exit_code::LIMIT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::MissingInput { .. } => exit_code::USAGE,
            Self::Storage { .. } | Self::Config(ConfigError::Store(_)) => exit_code::STORAGE,
            Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Storage { key, message } | CoreError::Serialization { key, message } => {
                CliError::Storage { key, message }
            }

            CoreError::InvalidEmail { email } => CliError::Validation {
                field: "email".into(),
                reason: format!("'{email}' is not a valid address"),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::PaymentRequestNotFound { token } => CliError::NotFound {
                resource_type: "payment request".into(),
                identifier: token,
                list_command: "requests list --all".into(),
            },

            CoreError::PaymentRequestExpired { token, expired_at } => {
                CliError::Expired { token, expired_at }
            }

            err @ (CoreError::PaymentRequestCompleted { .. }
            | CoreError::ParentAccountExists { .. }
            | CoreError::InvitationInvalid { .. }) => CliError::Conflict {
                message: err.to_string(),
            },

            CoreError::ParentAccountNotFound { identifier } => CliError::NotFound {
                resource_type: "parent account".into(),
                identifier,
                list_command: "parents list".into(),
            },

            CoreError::ChildNotFound { identifier } => CliError::NotFound {
                resource_type: "child profile".into(),
                identifier,
                list_command: "children list".into(),
            },

            CoreError::StudentLimitReached {
                account_type,
                max_students,
            } => CliError::StudentLimit {
                account_type,
                max_students,
            },

            CoreError::InvalidUpgrade { from, to } => CliError::InvalidUpgrade { from, to },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
