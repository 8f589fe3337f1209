//! Parent account command handlers.

use serde::Serialize;
use tabled::Tabled;

use scholarly_core::{
    AccountType, BillingPeriod, Capabilities, Engine, NewParentAccount, ParentAccount,
    SubscriptionType, UpgradeOptions, can_parent_add_more_students,
};

use crate::cli::{GlobalOpts, ParentsArgs, ParentsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

/// A parent account as shown to users: no password, with capabilities.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountView {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    pub account_type: AccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<SubscriptionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<BillingPeriod>,
    pub linked_students: Vec<String>,
    pub can_add_student: bool,
    pub capabilities: Capabilities,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgraded_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&ParentAccount> for AccountView {
    fn from(a: &ParentAccount) -> Self {
        Self {
            id: a.id.to_string(),
            email: a.email.clone(),
            first_name: a.first_name.clone(),
            account_type: a.account_type,
            subscription_type: a.subscription_type,
            billing_period: a.billing_period,
            linked_students: a.linked_students.clone(),
            can_add_student: can_parent_add_more_students(a),
            capabilities: a.capabilities(),
            created_at: a.created_at,
            upgraded_at: a.upgraded_at,
        }
    }
}

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Type")]
    account_type: String,
    #[tabled(rename = "Students")]
    students: String,
    #[tabled(rename = "Dashboard")]
    dashboard: String,
}

impl From<&AccountView> for AccountRow {
    fn from(a: &AccountView) -> Self {
        Self {
            id: a.id.clone(),
            email: a.email.clone(),
            account_type: a.account_type.to_string(),
            students: format!(
                "{}/{}",
                a.linked_students.len(),
                a.capabilities.max_students
            ),
            dashboard: a.capabilities.dashboard_access.to_string(),
        }
    }
}

fn detail(a: &AccountView) -> String {
    let caps = &a.capabilities;
    let students = if a.linked_students.is_empty() {
        "-".to_owned()
    } else {
        a.linked_students.join(", ")
    };
    let upgrades = if caps.upgrade_options.is_empty() {
        "-".to_owned()
    } else {
        caps.upgrade_options
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    [
        format!("ID:           {}", a.id),
        format!("Email:        {}", a.email),
        format!("Name:         {}", output::or_dash(a.first_name.as_deref())),
        format!("Type:         {}", a.account_type),
        format!(
            "Plan:         {} {}",
            output::or_dash(a.subscription_type),
            output::or_dash(a.billing_period)
        ),
        format!(
            "Students:     {students} ({}/{})",
            a.linked_students.len(),
            caps.max_students
        ),
        format!("Can Add:      {}", output::yes_no(a.can_add_student)),
        format!(
            "Scholarships: {}",
            caps.max_scholarships
                .map_or_else(|| "unlimited".into(), |n| n.to_string())
        ),
        format!("Dashboard:    {}", caps.dashboard_access),
        format!("Progress:     {}", output::yes_no(caps.progress_tracking)),
        format!("Upgrades:     {upgrades}"),
        format!("Created:      {}", a.created_at),
        format!("Upgraded:     {}", output::or_dash(a.upgraded_at)),
    ]
    .join("\n")
}

fn options_detail(o: &UpgradeOptions) -> String {
    if !o.has_account {
        return "No account for this email; a new one can be created.".into();
    }
    [
        format!("Type:         {}", output::or_dash(o.account_type)),
        format!("Students:     {}", o.linked_students),
        format!("Can Add:      {}", output::yes_no(o.can_add_student)),
        format!(
            "Upgrades:     {}",
            if o.upgrade_paths.is_empty() {
                "-".to_owned()
            } else {
                o.upgrade_paths
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(engine: &Engine, args: ParentsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let accounts = engine.parent_accounts();
    let print_one = |account: &ParentAccount| -> Result<(), CliError> {
        let view = AccountView::from(account);
        let out = output::render_single(&global.output, &view, detail, |a| a.id.clone())?;
        output::print_output(&out, global.quiet);
        Ok(())
    };

    match args.command {
        ParentsCommand::Create {
            email,
            student,
            account_type,
            first_name,
            plan_type,
            plan,
            password,
        } => {
            let password =
                util::password_or_prompt(password)?.ok_or_else(|| CliError::MissingInput {
                    what: "An account password".into(),
                    flag: "--password".into(),
                })?;
            let account = accounts.create_parent_account(NewParentAccount {
                email,
                password,
                student_name: student,
                account_type: account_type.into(),
                subscription_type: plan_type.map(Into::into),
                billing_period: plan.map(Into::into),
                first_name,
            })?;
            print_one(&account)
        }

        ParentsCommand::Get { account } => print_one(&util::resolve_account(engine, &account)?),

        ParentsCommand::List => {
            let views: Vec<AccountView> = accounts.list()?.iter().map(AccountView::from).collect();
            let out = output::render_list(&global.output, &views, |a| AccountRow::from(a), |a| {
                a.id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ParentsCommand::Upgrade {
            account,
            to,
            plan_type,
            plan,
        } => {
            let existing = util::resolve_account(engine, &account)?;
            let upgraded = accounts.upgrade_parent_account(
                &existing.id,
                to.into(),
                plan_type.map(Into::into),
                plan.map(Into::into),
            )?;
            print_one(&upgraded)
        }

        ParentsCommand::LinkStudent { account, student } => {
            let existing = util::resolve_account(engine, &account)?;
            let linked = accounts.link_student(&existing.id, &student)?;
            print_one(&linked)
        }

        ParentsCommand::Options { email } => {
            let options = accounts.get_parent_upgrade_options(&email)?;
            let out = output::render_single(&global.output, &options, options_detail, |o| {
                o.upgrade_paths
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use scholarly_core::EngineConfig;
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn account_view_omits_password() {
        let engine = Engine::in_memory(EngineConfig::default());
        let account = engine
            .parent_accounts()
            .create_parent_account(NewParentAccount {
                email: "p@example.com".into(),
                password: SecretString::from("hunter22".to_string()),
                student_name: "Sam".into(),
                account_type: AccountType::ParentFree,
                subscription_type: None,
                billing_period: None,
                first_name: None,
            })
            .unwrap();

        let json = serde_json::to_value(AccountView::from(&account)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["accountType"], "parent-free");
        assert_eq!(json["canAddStudent"], false);
        assert_eq!(json["capabilities"]["maxStudents"], 1);
    }
}
