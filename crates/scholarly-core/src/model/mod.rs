// ── Domain model ──
//
// Every type in this module is the canonical, serialized form of a
// record kept in the key-value store. Field names follow the camelCase
// JSON the records have always been stored with.

pub mod child;
pub mod email;
pub mod parent_account;
pub mod payment_request;
pub mod preferences;
pub mod pricing;
pub mod privacy;
pub mod subscription;
pub mod token;

// ── Re-exports ──────────────────────────────────────────────────────

pub use token::Token;

pub use email::{normalize_email, validate_email};

pub use pricing::{BillingPeriod, Cents, SubscriptionType, price};

pub use subscription::{PaymentMethod, Subscription, SubscriptionStatus, SubscriptionUpdate, Tier};

pub use payment_request::{NewPaymentRequest, PaymentRequest, PaymentRequestStatus};

pub use parent_account::{
    AccountType, Capabilities, DashboardAccess, NewParentAccount, ParentAccount, UpgradeOptions,
};

pub use privacy::{EligibilityTag, PRIVACY_FLAGS, PrivacySettings, Scholarship};

pub use preferences::CookieConsent;

pub use child::{ChildProfile, InvitationStatus, NewChildProfile};
