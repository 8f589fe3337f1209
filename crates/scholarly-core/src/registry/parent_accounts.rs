// ── Parent account registry ──
//
// CRUD over the `parentAccounts` array. Emails are stored normalized
// and are unique across the array.

use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::{
    AccountType, BillingPeriod, NewParentAccount, ParentAccount, SubscriptionType, Token,
    UpgradeOptions, normalize_email, validate_email,
};
use crate::store::PARENT_ACCOUNTS;

/// Whether `account` has room for another linked student.
pub fn can_parent_add_more_students(account: &ParentAccount) -> bool {
    let max = usize::try_from(account.capabilities().max_students).unwrap_or(usize::MAX);
    account.linked_students.len() < max
}

pub struct ParentAccountRegistry {
    engine: Engine,
}

impl ParentAccountRegistry {
    pub(crate) fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Create an account with `student_name` as its first linked student.
    pub fn create_parent_account(
        &self,
        request: NewParentAccount,
    ) -> Result<ParentAccount, CoreError> {
        validate_email(request.email.trim())?;
        if request.password.expose_secret().is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "password must not be empty".into(),
            });
        }

        let email = normalize_email(&request.email);
        let account = ParentAccount {
            id: Token::generate(),
            email: email.clone(),
            password: request.password.expose_secret().to_owned(),
            first_name: request.first_name,
            account_type: request.account_type,
            subscription_type: request.subscription_type,
            billing_period: request.billing_period,
            linked_students: linked_from(&request.student_name),
            created_at: self.engine.now(),
            upgraded_at: None,
        };

        let stored = account.clone();
        PARENT_ACCOUNTS.modify_or_default(self.engine.store(), move |accounts| {
            if accounts.iter().any(|a| a.email == email) {
                return Err(CoreError::ParentAccountExists { email });
            }
            accounts.push(stored);
            Ok(())
        })?;

        info!(id = %account.id, account_type = %account.account_type, "created parent account");
        Ok(account)
    }

    pub fn list(&self) -> Result<Vec<ParentAccount>, CoreError> {
        PARENT_ACCOUNTS.load_or_default(self.engine.store())
    }

    pub fn find_by_id(&self, id: &Token) -> Result<Option<ParentAccount>, CoreError> {
        Ok(self.list()?.into_iter().find(|a| a.id == *id))
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<ParentAccount>, CoreError> {
        let email = normalize_email(email);
        Ok(self.list()?.into_iter().find(|a| a.email == email))
    }

    /// Move an account to `new_type`, which must be one of its upgrade
    /// options. Subscription fields are replaced only when given.
    pub fn upgrade_parent_account(
        &self,
        id: &Token,
        new_type: AccountType,
        subscription_type: Option<SubscriptionType>,
        billing_period: Option<BillingPeriod>,
    ) -> Result<ParentAccount, CoreError> {
        let now = self.engine.now();
        let upgraded = self.modify_account(id, |account| {
            if !account.account_type.can_upgrade_to(new_type) {
                return Err(CoreError::InvalidUpgrade {
                    from: account.account_type.to_string(),
                    to: new_type.to_string(),
                });
            }
            account.account_type = new_type;
            if subscription_type.is_some() {
                account.subscription_type = subscription_type;
            }
            if billing_period.is_some() {
                account.billing_period = billing_period;
            }
            account.upgraded_at = Some(now);
            Ok(())
        })?;

        info!(id = %upgraded.id, account_type = %upgraded.account_type, "upgraded parent account");
        Ok(upgraded)
    }

    /// Link another student, respecting the account's student limit.
    /// Linking a name that is already linked is a no-op.
    pub fn link_student(&self, id: &Token, student_name: &str) -> Result<ParentAccount, CoreError> {
        let name = student_name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "student name must not be empty".into(),
            });
        }

        self.modify_account(id, |account| {
            if account.linked_students.iter().any(|s| s == name) {
                return Ok(());
            }
            if !can_parent_add_more_students(account) {
                let caps = account.capabilities();
                return Err(CoreError::StudentLimitReached {
                    account_type: account.account_type.to_string(),
                    max_students: caps.max_students,
                });
            }
            account.linked_students.push(name.to_owned());
            debug!(id = %account.id, student = name, "linked student");
            Ok(())
        })
    }

    /// What a parent arriving with `email` can do next.
    pub fn get_parent_upgrade_options(&self, email: &str) -> Result<UpgradeOptions, CoreError> {
        let Some(account) = self.find_by_email(email)? else {
            return Ok(UpgradeOptions::no_account());
        };
        Ok(UpgradeOptions {
            has_account: true,
            account_type: Some(account.account_type),
            can_add_student: can_parent_add_more_students(&account),
            linked_students: account.linked_students.len(),
            upgrade_paths: account.capabilities().upgrade_options.to_vec(),
        })
    }

    fn modify_account(
        &self,
        id: &Token,
        f: impl FnOnce(&mut ParentAccount) -> Result<(), CoreError>,
    ) -> Result<ParentAccount, CoreError> {
        PARENT_ACCOUNTS.modify_or_default(self.engine.store(), |accounts| {
            let account = accounts
                .iter_mut()
                .find(|a| a.id == *id)
                .ok_or_else(|| CoreError::ParentAccountNotFound {
                    identifier: id.to_string(),
                })?;
            f(account)?;
            Ok(account.clone())
        })
    }
}

fn linked_from(student_name: &str) -> Vec<String> {
    let name = student_name.trim();
    if name.is_empty() {
        Vec::new()
    } else {
        vec![name.to_owned()]
    }
}
