// ── Entitlement queries ──
//
// Pure functions over a subscription record. None of them touch the
// store; a missing subscription is the `{free, free}` record.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::model::{BillingPeriod, Cents, Subscription, SubscriptionType, Tier, price};

/// Product features a session may or may not be allowed to use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    // Always available
    BasicSearch,
    Profile,
    ScholarshipBrowsing,
    // Premium
    UnlimitedScholarships,
    AdvancedMatching,
    ApplicationTracking,
    DeadlineReminders,
    EssayAssistance,
    ParentDashboard,
}

impl Feature {
    /// Whether the feature sits behind a paid or trial subscription.
    pub fn is_premium(self) -> bool {
        !matches!(
            self,
            Self::BasicSearch | Self::Profile | Self::ScholarshipBrowsing
        )
    }

    pub fn premium() -> impl Iterator<Item = Feature> {
        Self::iter().filter(|f| f.is_premium())
    }
}

/// `true` iff the subscription is active or in trial.
pub fn check_subscription_status(subscription: &Subscription) -> bool {
    subscription.status.is_entitled()
}

/// Whether `feature` is unavailable under `subscription`.
pub fn is_feature_locked(subscription: &Subscription, feature: Feature) -> bool {
    if subscription.status.is_entitled() {
        return false;
    }
    feature.is_premium()
}

/// Like [`is_feature_locked`] for a feature named by string. Names
/// outside the known feature set are never locked.
pub fn is_feature_name_locked(subscription: &Subscription, feature: &str) -> bool {
    feature
        .parse::<Feature>()
        .is_ok_and(|f| is_feature_locked(subscription, f))
}

/// Premium tier *and* currently entitled. An expired subscription that
/// still carries `tier = premium` is not premium.
pub fn is_premium_user(subscription: &Subscription) -> bool {
    subscription.tier == Tier::Premium && subscription.status.is_entitled()
}

/// Price of a plan from the static table.
pub fn subscription_price(subscription_type: SubscriptionType, period: BillingPeriod) -> Cents {
    price(subscription_type, period)
}

/// Start and end of a trial beginning at `now`.
pub fn trial_window(now: DateTime<Utc>, days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + Duration::days(days))
}

/// Time left before the current trial or paid period ends, if any.
pub fn time_remaining(subscription: &Subscription, now: DateTime<Utc>) -> Option<Duration> {
    use crate::model::SubscriptionStatus;

    let end = match subscription.status {
        SubscriptionStatus::Trial => subscription.trial_ends_at?,
        SubscriptionStatus::Active => subscription.expires_at?,
        SubscriptionStatus::Free | SubscriptionStatus::Expired => return None,
    };
    Some((end - now).max(Duration::zero()))
}

/// Summary of every entitlement decision for one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlements {
    pub subscription_active: bool,
    pub premium: bool,
    pub locked_features: Vec<Feature>,
}

impl Entitlements {
    pub fn of(subscription: &Subscription) -> Self {
        Self {
            subscription_active: check_subscription_status(subscription),
            premium: is_premium_user(subscription),
            locked_features: Feature::iter()
                .filter(|f| is_feature_locked(subscription, *f))
                .collect(),
        }
    }
}
