//! Subscription, entitlement and account state for the Scholarly app.
//!
//! This crate sits between a key-value store and whatever presents the
//! data (CLI, web shell). It provides:
//!
//! - **[`Engine`]**: bundles the injected [`KeyValueStore`], [`Clock`]
//!   and [`EngineConfig`] and vends everything below.
//! - **[`SubscriptionSession`]**: the live subscription record: first-visit
//!   trial, partial updates, change notification and a periodic expiry
//!   sweep on a background task.
//! - **Entitlement queries**: pure functions in [`entitlement`] deciding
//!   which [`Feature`]s are locked.
//! - **Registries**: payment requests, parent accounts and child
//!   profiles, each mutated through the store's atomic update.
//! - **[`filter_scholarships_by_privacy`]**: hides listings whose
//!   eligibility depends on attributes the student keeps private.
//! - **[`Checkout`]**: simulated payment completion.

pub mod checkout;
pub mod clock;
pub mod config;
pub mod engine;
pub mod entitlement;
pub mod error;
pub mod model;
pub mod preferences;
pub mod privacy;
pub mod registry;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────

pub use checkout::{Checkout, CheckoutReceipt, Payer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::Engine;
pub use entitlement::{
    Entitlements, Feature, check_subscription_status, is_feature_locked, is_feature_name_locked,
    is_premium_user, subscription_price,
};
pub use error::CoreError;
pub use preferences::{Preferences, ScholarshipList};
pub use privacy::{PrivacyFilterResult, filter_scholarships_by_privacy};
pub use registry::{
    ChildRegistry, ParentAccountRegistry, PaymentRequestRegistry, can_parent_add_more_students,
};
pub use session::SubscriptionSession;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use stream::{SubscriptionStream, SubscriptionWatch};

// ── Model re-exports ────────────────────────────────────────────────

pub use model::{
    AccountType, BillingPeriod, Capabilities, Cents, ChildProfile, CookieConsent, DashboardAccess,
    EligibilityTag, InvitationStatus, NewChildProfile, NewParentAccount, NewPaymentRequest,
    ParentAccount, PaymentMethod, PaymentRequest, PaymentRequestStatus, PrivacySettings,
    Scholarship, Subscription, SubscriptionStatus, SubscriptionType, SubscriptionUpdate, Tier,
    Token, UpgradeOptions,
};
