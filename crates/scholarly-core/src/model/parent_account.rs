// ── Parent accounts and their capability sets ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::pricing::{BillingPeriod, SubscriptionType};
use super::token::Token;

/// Kind of parent account. Capabilities are derived from this alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AccountType {
    /// Paid for a student's plan, nothing more.
    PaymentOnly,
    /// Free parent dashboard with one linked student.
    ParentFree,
    /// Paid parent plan.
    ParentPaid,
}

/// How much of the parent dashboard an account can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DashboardAccess {
    None,
    Limited,
    Full,
}

/// The static bundle of limits attached to an account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub max_students: u32,
    /// `None` means unlimited.
    pub max_scholarships: Option<u32>,
    pub dashboard_access: DashboardAccess,
    pub progress_tracking: bool,
    pub upgrade_options: &'static [AccountType],
}

impl AccountType {
    pub const ALL: [AccountType; 3] = [Self::PaymentOnly, Self::ParentFree, Self::ParentPaid];

    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::PaymentOnly => Capabilities {
                max_students: 0,
                max_scholarships: Some(0),
                dashboard_access: DashboardAccess::None,
                progress_tracking: false,
                upgrade_options: &[Self::ParentFree, Self::ParentPaid],
            },
            Self::ParentFree => Capabilities {
                max_students: 1,
                max_scholarships: Some(10),
                dashboard_access: DashboardAccess::Limited,
                progress_tracking: false,
                upgrade_options: &[Self::ParentPaid],
            },
            Self::ParentPaid => Capabilities {
                max_students: 3,
                max_scholarships: None,
                dashboard_access: DashboardAccess::Full,
                progress_tracking: true,
                upgrade_options: &[],
            },
        }
    }

    pub fn can_upgrade_to(self, target: AccountType) -> bool {
        self.capabilities().upgrade_options.contains(&target)
    }
}

/// A parent account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentAccount {
    pub id: Token,
    pub email: String,
    /// Stored as entered. This model has no authentication backend.
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<SubscriptionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<BillingPeriod>,
    #[serde(default)]
    pub linked_students: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgraded_at: Option<DateTime<Utc>>,
}

impl ParentAccount {
    pub fn capabilities(&self) -> Capabilities {
        self.account_type.capabilities()
    }
}

/// Input for creating a parent account.
#[derive(Debug, Clone)]
pub struct NewParentAccount {
    pub email: String,
    pub password: secrecy::SecretString,
    pub student_name: String,
    pub account_type: AccountType,
    pub subscription_type: Option<SubscriptionType>,
    pub billing_period: Option<BillingPeriod>,
    pub first_name: Option<String>,
}

/// What the UI should offer a parent arriving with a given email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeOptions {
    pub has_account: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    pub can_add_student: bool,
    pub linked_students: usize,
    pub upgrade_paths: Vec<AccountType>,
}

impl UpgradeOptions {
    /// Options for an email with no account: every account type is on offer.
    pub fn no_account() -> Self {
        Self {
            has_account: false,
            account_type: None,
            can_add_student: true,
            linked_students: 0,
            upgrade_paths: AccountType::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_table_matches_account_tiers() {
        assert_eq!(AccountType::PaymentOnly.capabilities().max_students, 0);
        assert_eq!(AccountType::ParentFree.capabilities().max_students, 1);
        assert_eq!(AccountType::ParentPaid.capabilities().max_students, 3);
        assert_eq!(AccountType::ParentPaid.capabilities().max_scholarships, None);
        assert!(AccountType::ParentPaid.capabilities().progress_tracking);
    }

    #[test]
    fn upgrades_only_move_up() {
        assert!(AccountType::PaymentOnly.can_upgrade_to(AccountType::ParentPaid));
        assert!(AccountType::ParentFree.can_upgrade_to(AccountType::ParentPaid));
        assert!(!AccountType::ParentPaid.can_upgrade_to(AccountType::ParentFree));
        assert!(!AccountType::ParentFree.can_upgrade_to(AccountType::ParentFree));
    }

    #[test]
    fn account_type_uses_kebab_case() {
        assert_eq!(AccountType::PaymentOnly.to_string(), "payment-only");
        assert_eq!(
            "parent-paid".parse::<AccountType>().ok(),
            Some(AccountType::ParentPaid)
        );
        assert_eq!(
            serde_json::to_string(&AccountType::ParentFree).ok().as_deref(),
            Some("\"parent-free\"")
        );
    }

    #[test]
    fn stored_capabilities_field_is_ignored_on_read() {
        let json = r#"{
            "id": "p1", "email": "a@b.co", "password": "x",
            "accountType": "parent-free",
            "capabilities": {"maxStudents": 99},
            "linkedStudents": ["Sam"],
            "createdAt": "2026-01-01T00:00:00Z"
        }"#;
        let account: ParentAccount = serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(account.capabilities().max_students, 1);
    }
}
