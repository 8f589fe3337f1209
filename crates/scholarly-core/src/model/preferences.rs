// ── Cookie consent ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The visitor's cookie choices. Necessary cookies cannot be declined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieConsent {
    pub necessary: bool,
    pub analytics: bool,
    pub marketing: bool,
    pub decided_at: DateTime<Utc>,
}

impl CookieConsent {
    pub fn new(analytics: bool, marketing: bool, decided_at: DateTime<Utc>) -> Self {
        Self {
            necessary: true,
            analytics,
            marketing,
            decided_at,
        }
    }
}
