//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use scholarly_core::{
    AccountType, BillingPeriod, Engine, ParentAccount, PaymentMethod, SubscriptionStatus,
    SubscriptionType, Tier, Token,
};

use crate::cli::{AccountTypeArg, PaymentMethodArg, PlanArg, PlanTypeArg, StatusArg, TierArg};
use crate::error::CliError;

// ── Arg → core conversions ───────────────────────────────────────────

impl From<StatusArg> for SubscriptionStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Free => Self::Free,
            StatusArg::Trial => Self::Trial,
            StatusArg::Active => Self::Active,
            StatusArg::Expired => Self::Expired,
        }
    }
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Free => Self::Free,
            TierArg::Basic => Self::Basic,
            TierArg::Premium => Self::Premium,
        }
    }
}

impl From<PaymentMethodArg> for PaymentMethod {
    fn from(arg: PaymentMethodArg) -> Self {
        match arg {
            PaymentMethodArg::Direct => Self::Direct,
            PaymentMethodArg::Parent => Self::Parent,
        }
    }
}

impl From<PlanArg> for BillingPeriod {
    fn from(arg: PlanArg) -> Self {
        match arg {
            PlanArg::Monthly => Self::Monthly,
            PlanArg::Annual => Self::Annual,
        }
    }
}

impl From<PlanTypeArg> for SubscriptionType {
    fn from(arg: PlanTypeArg) -> Self {
        match arg {
            PlanTypeArg::Student => Self::Student,
            PlanTypeArg::Parent => Self::Parent,
        }
    }
}

impl From<AccountTypeArg> for AccountType {
    fn from(arg: AccountTypeArg) -> Self {
        match arg {
            AccountTypeArg::PaymentOnly => Self::PaymentOnly,
            AccountTypeArg::ParentFree => Self::ParentFree,
            AccountTypeArg::ParentPaid => Self::ParentPaid,
        }
    }
}

// ── Time arguments ───────────────────────────────────────────────────

/// Parse an absolute timestamp flag. `"none"` clears the field.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<Option<DateTime<Utc>>, CliError> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|t| Some(t.with_timezone(&Utc)))
        .map_err(|e| CliError::Validation {
            field: field.into(),
            reason: format!("expected an RFC 3339 timestamp or \"none\": {e}"),
        })
}

/// Resolve a relative flag like `30days` against `now`.
pub fn parse_relative(
    field: &str,
    raw: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, CliError> {
    let invalid = |reason: String| CliError::Validation {
        field: field.into(),
        reason,
    };
    let std_dur = humantime::parse_duration(raw).map_err(|e| invalid(e.to_string()))?;
    let dur = chrono::Duration::from_std(std_dur).map_err(|e| invalid(e.to_string()))?;
    now.checked_add_signed(dur)
        .ok_or_else(|| invalid(format!("'{raw}' is too far in the future")))
}

/// Human-readable remaining time, rounded to whole minutes.
pub fn format_remaining(remaining: chrono::Duration) -> String {
    let secs = remaining.num_minutes().max(0).unsigned_abs() * 60;
    if secs == 0 {
        return "less than a minute".into();
    }
    humantime::format_duration(std::time::Duration::from_secs(secs)).to_string()
}

// ── Lookups ──────────────────────────────────────────────────────────

/// Resolve a parent account by id or email.
pub fn resolve_account(engine: &Engine, identifier: &str) -> Result<ParentAccount, CliError> {
    let accounts = engine.parent_accounts();
    let found = if identifier.contains('@') {
        accounts.find_by_email(identifier)?
    } else {
        accounts.find_by_id(&Token::from(identifier.trim()))?
    };
    found.ok_or_else(|| CliError::NotFound {
        resource_type: "parent account".into(),
        identifier: identifier.into(),
        list_command: "parents list".into(),
    })
}

// ── Interaction ──────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Use the given password, or prompt for one when attached to a terminal.
pub fn password_or_prompt(given: Option<String>) -> Result<Option<SecretString>, CliError> {
    if let Some(pw) = given {
        return Ok(Some(SecretString::from(pw)));
    }
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }
    let pw = dialoguer::Password::new()
        .with_prompt("Parent account password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(prompt_err)?;
    Ok(Some(SecretString::from(pw)))
}

/// Read and parse a JSON file.
pub fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: path.display().to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}
