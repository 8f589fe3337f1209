// ── Record registries ──
//
// Each registry owns one array-valued key and performs every mutation
// through the store's atomic update.

pub mod children;
pub mod parent_accounts;
pub mod payment_requests;

pub use children::ChildRegistry;
pub use parent_accounts::{ParentAccountRegistry, can_parent_add_more_students};
pub use payment_requests::PaymentRequestRegistry;
