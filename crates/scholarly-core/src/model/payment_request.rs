// ── Payment request ("ask my parent to pay") ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::pricing::{BillingPeriod, Cents, SubscriptionType};
use super::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentRequestStatus {
    Pending,
    Completed,
    Expired,
}

/// One request sent to a parent asking them to pay for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub id: Token,
    pub token: Token,
    pub student_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_email: Option<String>,
    pub parent_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub subscription_type: SubscriptionType,
    pub amount: Cents,
    pub plan: BillingPeriod,
    pub status: PaymentRequestStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PaymentRequest {
    /// Past `expires_at`, a request is hidden from reads.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_pending(&self) -> bool {
        self.status == PaymentRequestStatus::Pending
    }
}

/// Input for creating a payment request.
#[derive(Debug, Clone, Default)]
pub struct NewPaymentRequest {
    pub student_name: String,
    pub parent_email: String,
    pub parent_name: Option<String>,
    pub message: Option<String>,
    pub student_email: Option<String>,
    pub subscription_type: SubscriptionType,
    pub billing_period: BillingPeriod,
}

impl NewPaymentRequest {
    pub fn new(student_name: impl Into<String>, parent_email: impl Into<String>) -> Self {
        Self {
            student_name: student_name.into(),
            parent_email: parent_email.into(),
            ..Self::default()
        }
    }
}
