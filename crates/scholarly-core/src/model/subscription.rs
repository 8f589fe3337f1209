// ── Subscription domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::entitlement::trial_window;
use crate::error::CoreError;

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionStatus {
    Free,
    Trial,
    Active,
    Expired,
}

impl SubscriptionStatus {
    /// Trial and active subscriptions are entitled to their tier.
    pub fn is_entitled(self) -> bool {
        matches!(self, Self::Trial | Self::Active)
    }
}

/// Plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Free,
    Basic,
    Premium,
}

/// Who paid for the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    Direct,
    Parent,
}

/// The one subscription record owned by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub status: SubscriptionStatus,
    pub tier: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_name: Option<String>,
}

impl Subscription {
    /// The `{free, free}` record used whenever nothing better is known.
    pub fn free() -> Self {
        Self {
            status: SubscriptionStatus::Free,
            tier: Tier::Free,
            expires_at: None,
            trial_ends_at: None,
            payment_method: None,
            payer_email: None,
            payer_name: None,
        }
    }

    /// A premium trial ending `days` after `now`.
    pub fn trial(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            status: SubscriptionStatus::Trial,
            tier: Tier::Premium,
            trial_ends_at: Some(trial_window(now, days).1),
            ..Self::free()
        }
    }

    /// Check the record-level invariants: a trial carries its end date,
    /// an active subscription carries its expiry.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self.status {
            SubscriptionStatus::Trial if self.trial_ends_at.is_none() => {
                Err(CoreError::ValidationFailed {
                    message: "a trial subscription requires trialEndsAt".into(),
                })
            }
            SubscriptionStatus::Active if self.expires_at.is_none() => {
                Err(CoreError::ValidationFailed {
                    message: "an active subscription requires expiresAt".into(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Shallow-merge a partial update into this record.
    pub fn apply(&mut self, update: SubscriptionUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(tier) = update.tier {
            self.tier = tier;
        }
        if let Some(expires_at) = update.expires_at {
            self.expires_at = expires_at;
        }
        if let Some(trial_ends_at) = update.trial_ends_at {
            self.trial_ends_at = trial_ends_at;
        }
        if let Some(payment_method) = update.payment_method {
            self.payment_method = payment_method;
        }
        if let Some(payer_email) = update.payer_email {
            self.payer_email = payer_email;
        }
        if let Some(payer_name) = update.payer_name {
            self.payer_name = payer_name;
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::free()
    }
}

/// A partial subscription update.
///
/// Outer `None` leaves a field untouched; for optional fields,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub status: Option<SubscriptionStatus>,
    pub tier: Option<Tier>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub trial_ends_at: Option<Option<DateTime<Utc>>>,
    pub payment_method: Option<Option<PaymentMethod>>,
    pub payer_email: Option<Option<String>>,
    pub payer_name: Option<Option<String>>,
}

impl SubscriptionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    #[test]
    fn trial_sets_end_date_and_premium_tier() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let sub = Subscription::trial(now, 7);
        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert_eq!(sub.tier, Tier::Premium);
        assert_eq!(sub.trial_ends_at, Some(now + Duration::days(7)));
        assert!(sub.validate().is_ok());
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut sub = Subscription::free();
        sub.apply(SubscriptionUpdate {
            tier: Some(Tier::Basic),
            payer_name: Some(Some("Dana".into())),
            ..SubscriptionUpdate::default()
        });
        assert_eq!(sub.status, SubscriptionStatus::Free);
        assert_eq!(sub.tier, Tier::Basic);
        assert_eq!(sub.payer_name.as_deref(), Some("Dana"));

        sub.apply(SubscriptionUpdate {
            payer_name: Some(None),
            ..SubscriptionUpdate::default()
        });
        assert_eq!(sub.payer_name, None);
    }

    #[test]
    fn active_without_expiry_is_rejected() {
        let mut sub = Subscription::free();
        sub.status = SubscriptionStatus::Active;
        assert!(matches!(
            sub.validate(),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn serializes_camel_case_and_skips_empty_fields() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(Subscription::trial(now, 7)).unwrap();
        assert_eq!(json["status"], "trial");
        assert_eq!(json["tier"], "premium");
        assert!(json.get("trialEndsAt").is_some());
        assert!(json.get("expiresAt").is_none());
    }

    #[test]
    fn status_parses_from_lowercase() {
        assert_eq!(
            "expired".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Expired
        );
        assert!("gold".parse::<Tier>().is_err());
    }
}
