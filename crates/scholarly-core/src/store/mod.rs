// ── Key-value persistence ──
//
// Every record lives as a JSON string under one top-level key. The
// `KeyValueStore` trait is the only seam between the account model and
// whatever holds those strings; registries receive it by injection.

mod file;
mod keys;
mod memory;

use crate::error::CoreError;

pub use file::FileStore;
pub use keys::{
    APPLIED_SCHOLARSHIPS, CHILDREN, COOKIE_CONSENT, FIRST_VISIT, Key, PARENT_ACCOUNTS,
    PAYMENT_REQUESTS, PRIVACY_SETTINGS, SAVED_SCHOLARSHIPS, SUBSCRIPTION,
};
pub use memory::MemoryStore;

/// Read-modify-write callback handed to [`KeyValueStore::update`].
///
/// Receives the current raw value (if any) and returns the value to
/// store, or `None` to delete the key. Returning an error aborts the
/// update and leaves the stored value untouched.
pub type UpdateFn<'a> = dyn FnMut(Option<&str>) -> Result<Option<String>, CoreError> + 'a;

/// String-keyed store of JSON blobs.
///
/// Implementations must make [`update`](Self::update) atomic with
/// respect to every other call on the same store: no write may land
/// between its read and its write.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    fn put(&self, key: &str, value: String) -> Result<(), CoreError>;

    /// Remove a key. Returns `true` if it existed.
    fn delete(&self, key: &str) -> Result<bool, CoreError>;

    /// All keys currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>, CoreError>;

    /// Atomically replace the value under `key`.
    ///
    /// The callback must not call back into the same store.
    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<(), CoreError>;
}
