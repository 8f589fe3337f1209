// ── Plan pricing ──

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who the purchased plan is for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionType {
    #[default]
    Student,
    Parent,
}

/// Billing cadence.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BillingPeriod {
    #[default]
    Monthly,
    Annual,
}

impl BillingPeriod {
    /// How long one paid period lasts.
    pub fn duration(self) -> Duration {
        match self {
            Self::Monthly => Duration::days(30),
            Self::Annual => Duration::days(365),
        }
    }
}

/// An amount of US currency in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(pub u32);

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// The static price table.
pub fn price(subscription_type: SubscriptionType, period: BillingPeriod) -> Cents {
    match (subscription_type, period) {
        (SubscriptionType::Student, BillingPeriod::Monthly) => Cents(999),
        (SubscriptionType::Student, BillingPeriod::Annual) => Cents(9_999),
        (SubscriptionType::Parent, BillingPeriod::Monthly) => Cents(1_499),
        (SubscriptionType::Parent, BillingPeriod::Annual) => Cents(14_999),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annual_plans_cost_less_than_twelve_months() {
        for ty in [SubscriptionType::Student, SubscriptionType::Parent] {
            let monthly = price(ty, BillingPeriod::Monthly).0;
            let annual = price(ty, BillingPeriod::Annual).0;
            assert!(annual < monthly * 12, "{ty}: {annual} >= 12 x {monthly}");
        }
    }

    #[test]
    fn cents_display_as_dollars() {
        assert_eq!(Cents(999).to_string(), "$9.99");
        assert_eq!(Cents(14_999).to_string(), "$149.99");
        assert_eq!(Cents(5).to_string(), "$0.05");
    }
}
