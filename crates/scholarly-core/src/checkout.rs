// ── Simulated checkout ──
//
// No payment processor is involved. Completing a request marks it paid,
// activates the session's subscription, and for parent plans makes sure
// the payer holds a parent-paid account.

use secrecy::SecretString;
use serde::Serialize;
use tracing::info;

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::{
    AccountType, BillingPeriod, NewParentAccount, ParentAccount, PaymentMethod, PaymentRequest,
    PaymentRequestStatus, Subscription, SubscriptionType, Token, validate_email,
};
use crate::session::SubscriptionSession;

/// Who is paying for a request.
#[derive(Debug, Clone)]
pub struct Payer {
    pub email: String,
    pub name: Option<String>,
    /// Needed only when a parent plan has to create a new account.
    pub password: Option<SecretString>,
}

/// What a completed checkout changed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub request: Option<PaymentRequest>,
    pub subscription: Subscription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_account: Option<ParentAccount>,
}

pub struct Checkout {
    engine: Engine,
    session: SubscriptionSession,
}

impl Checkout {
    pub fn new(engine: &Engine, session: &SubscriptionSession) -> Self {
        Self {
            engine: engine.clone(),
            session: session.clone(),
        }
    }

    /// The request behind `token`, if it can still be paid.
    pub fn validate_payment_token(&self, token: &Token) -> Result<PaymentRequest, CoreError> {
        self.engine.payment_requests().validate_payment_token(token)
    }

    /// Pay for the request behind `token`.
    pub fn complete_payment_request(
        &self,
        token: &Token,
        payer: Payer,
    ) -> Result<CheckoutReceipt, CoreError> {
        validate_email(payer.email.trim())?;
        let requests = self.engine.payment_requests();
        let request = requests.validate_payment_token(token)?;

        let parent_account = match request.subscription_type {
            SubscriptionType::Parent => Some(self.ensure_parent_paid(&request, &payer)?),
            SubscriptionType::Student => None,
        };

        if !requests.update_payment_request_status(token, PaymentRequestStatus::Completed)? {
            return Err(CoreError::PaymentRequestNotFound {
                token: token.to_string(),
            });
        }

        let subscription = self.session.activate(
            request.plan,
            PaymentMethod::Parent,
            Some(payer.email.trim().to_owned()),
            payer.name.clone(),
        )?;
        info!(%token, amount = %request.amount, "payment request completed");

        Ok(CheckoutReceipt {
            request: requests.get_payment_request_by_token(token)?,
            subscription,
            parent_account,
        })
    }

    /// A student paying for themselves.
    pub fn direct_checkout(&self, period: BillingPeriod) -> Result<CheckoutReceipt, CoreError> {
        let subscription = self
            .session
            .activate(period, PaymentMethod::Direct, None, None)?;
        Ok(CheckoutReceipt {
            request: None,
            subscription,
            parent_account: None,
        })
    }

    fn ensure_parent_paid(
        &self,
        request: &PaymentRequest,
        payer: &Payer,
    ) -> Result<ParentAccount, CoreError> {
        let accounts = self.engine.parent_accounts();

        let Some(existing) = accounts.find_by_email(&payer.email)? else {
            let password = payer.password.clone().ok_or_else(|| CoreError::ValidationFailed {
                message: "a password is required to create the parent account".into(),
            })?;
            return accounts.create_parent_account(NewParentAccount {
                email: payer.email.clone(),
                password,
                student_name: request.student_name.clone(),
                account_type: AccountType::ParentPaid,
                subscription_type: Some(SubscriptionType::Parent),
                billing_period: Some(request.plan),
                first_name: payer.name.clone().or_else(|| request.parent_name.clone()),
            });
        };

        if existing.account_type != AccountType::ParentPaid {
            accounts.upgrade_parent_account(
                &existing.id,
                AccountType::ParentPaid,
                Some(SubscriptionType::Parent),
                Some(request.plan),
            )?;
        }
        accounts.link_student(&existing.id, &request.student_name)
    }
}
