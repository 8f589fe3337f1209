// ── Payment request registry ──
//
// CRUD over the `paymentRequests` array. Expired requests stay in
// storage and are only hidden from reads.

use chrono::Duration;
use tracing::{debug, info};
use url::Url;

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::{
    NewPaymentRequest, PaymentRequest, PaymentRequestStatus, Token, normalize_email, price,
    validate_email,
};
use crate::store::PAYMENT_REQUESTS;

pub struct PaymentRequestRegistry {
    engine: Engine,
}

impl PaymentRequestRegistry {
    pub(crate) fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Record a new pending request and return it.
    pub fn create_payment_request(
        &self,
        request: NewPaymentRequest,
    ) -> Result<PaymentRequest, CoreError> {
        validate_email(request.parent_email.trim())?;
        if let Some(ref email) = request.student_email {
            validate_email(email.trim())?;
        }
        if request.student_name.trim().is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "student name must not be empty".into(),
            });
        }

        let now = self.engine.now();
        let id = Token::generate();
        let token = Token::generate_distinct_from(&id);
        let record = PaymentRequest {
            id,
            token,
            student_name: request.student_name.trim().to_owned(),
            student_email: request.student_email.as_deref().map(normalize_email),
            parent_email: normalize_email(&request.parent_email),
            parent_name: request.parent_name,
            message: request.message,
            subscription_type: request.subscription_type,
            amount: price(request.subscription_type, request.billing_period),
            plan: request.billing_period,
            status: PaymentRequestStatus::Pending,
            created_at: now,
            expires_at: now + Duration::days(self.engine.config().payment_request_ttl_days),
            completed_at: None,
        };

        let stored = record.clone();
        PAYMENT_REQUESTS.modify_or_default(self.engine.store(), move |requests| {
            requests.push(stored);
            Ok(())
        })?;

        info!(
            token = %record.token,
            plan = %record.plan,
            amount = %record.amount,
            "created payment request"
        );
        Ok(record)
    }

    /// Every stored request, expired ones included.
    pub fn all_payment_requests(&self) -> Result<Vec<PaymentRequest>, CoreError> {
        PAYMENT_REQUESTS.load_or_default(self.engine.store())
    }

    /// Requests that have not yet passed their expiry.
    pub fn get_payment_requests(&self) -> Result<Vec<PaymentRequest>, CoreError> {
        let now = self.engine.now();
        let requests = self.all_payment_requests()?;
        let total = requests.len();
        let live: Vec<_> = requests
            .into_iter()
            .filter(|r| !r.is_expired_at(now))
            .collect();
        debug!(total, live = live.len(), "read payment requests");
        Ok(live)
    }

    pub fn get_payment_request_by_token(
        &self,
        token: &Token,
    ) -> Result<Option<PaymentRequest>, CoreError> {
        Ok(self
            .get_payment_requests()?
            .into_iter()
            .find(|r| r.token == *token))
    }

    /// Set a request's status. Returns `false` when no request has
    /// `token`.
    pub fn update_payment_request_status(
        &self,
        token: &Token,
        status: PaymentRequestStatus,
    ) -> Result<bool, CoreError> {
        let now = self.engine.now();
        let result = PAYMENT_REQUESTS.modify_or_default(self.engine.store(), |requests| {
            let request = requests
                .iter_mut()
                .find(|r| r.token == *token)
                .ok_or_else(|| CoreError::PaymentRequestNotFound {
                    token: token.to_string(),
                })?;
            request.status = status;
            request.completed_at = (status == PaymentRequestStatus::Completed).then_some(now);
            Ok(())
        });

        match result {
            Ok(()) => {
                debug!(%token, %status, "updated payment request status");
                Ok(true)
            }
            Err(CoreError::PaymentRequestNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Pending, unexpired requests, newest first.
    pub fn pending_requests(&self) -> Result<Vec<PaymentRequest>, CoreError> {
        let mut pending: Vec<_> = self
            .get_payment_requests()?
            .into_iter()
            .filter(PaymentRequest::is_pending)
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    pub fn has_pending_payment_request(&self) -> Result<bool, CoreError> {
        Ok(!self.pending_requests()?.is_empty())
    }

    pub fn get_most_recent_pending_request(&self) -> Result<Option<PaymentRequest>, CoreError> {
        Ok(self.pending_requests()?.into_iter().next())
    }

    /// Check that `token` names a request that can still be paid.
    ///
    /// Unlike the plain lookup, this distinguishes a token that never
    /// existed from one that has expired or was already paid.
    pub fn validate_payment_token(&self, token: &Token) -> Result<PaymentRequest, CoreError> {
        let now = self.engine.now();
        let request = self
            .all_payment_requests()?
            .into_iter()
            .find(|r| r.token == *token)
            .ok_or_else(|| CoreError::PaymentRequestNotFound {
                token: token.to_string(),
            })?;

        if request.status == PaymentRequestStatus::Completed {
            return Err(CoreError::PaymentRequestCompleted {
                token: token.to_string(),
            });
        }
        if request.status == PaymentRequestStatus::Expired || request.is_expired_at(now) {
            return Err(CoreError::PaymentRequestExpired {
                token: token.to_string(),
                expired_at: request.expires_at.to_rfc3339(),
            });
        }
        Ok(request)
    }

    /// Link a parent follows to pay for a student's plan.
    pub fn payment_link(&self, token: &Token) -> Url {
        self.engine.config().link(&format!("pay/{token}"))
    }

    /// Link for a parent paying for their own parent plan.
    pub fn parent_payment_link(&self, token: &Token) -> Url {
        self.engine.config().link(&format!("parent-payment/{token}"))
    }
}
