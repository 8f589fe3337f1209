// ── Typed storage keys ──
//
// A `Key<T>` pairs a storage key name with the JSON type stored under
// it. Malformed stored JSON is logged and read as absent.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::CoreError;
use crate::model::{
    ChildProfile, CookieConsent, ParentAccount, PaymentRequest, PrivacySettings, Subscription,
};

pub const SUBSCRIPTION: Key<Subscription> = Key::new("subscription");
pub const FIRST_VISIT: Key<bool> = Key::new("hasVisitedBefore");
pub const PAYMENT_REQUESTS: Key<Vec<PaymentRequest>> = Key::new("paymentRequests");
pub const PARENT_ACCOUNTS: Key<Vec<ParentAccount>> = Key::new("parentAccounts");
pub const COOKIE_CONSENT: Key<CookieConsent> = Key::new("cookieConsent");
pub const CHILDREN: Key<Vec<ChildProfile>> = Key::new("children");
pub const PRIVACY_SETTINGS: Key<PrivacySettings> = Key::new("privacySettings");
pub const SAVED_SCHOLARSHIPS: Key<Vec<String>> = Key::new("savedScholarships");
pub const APPLIED_SCHOLARSHIPS: Key<Vec<String>> = Key::new("appliedScholarships");

/// A storage key with the type of value it holds.
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> std::fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Key<T> {
    /// Read and decode the value. Absent and malformed values both
    /// read as `None`.
    pub fn load(self, store: &dyn KeyValueStore) -> Result<Option<T>, CoreError> {
        let raw = store.get(self.name)?;
        Ok(raw.and_then(|raw| self.decode(&raw)))
    }

    pub fn save(self, store: &dyn KeyValueStore, value: &T) -> Result<(), CoreError> {
        let encoded = self.encode(value)?;
        store.put(self.name, encoded)?;
        debug!(key = self.name, "stored value");
        Ok(())
    }

    pub fn remove(self, store: &dyn KeyValueStore) -> Result<bool, CoreError> {
        store.delete(self.name)
    }

    /// Atomic read-modify-write of the decoded value.
    ///
    /// `init` supplies the value when nothing (or nothing readable) is
    /// stored. If `f` fails, nothing is written.
    pub fn modify<R>(
        self,
        store: &dyn KeyValueStore,
        init: impl FnOnce() -> T,
        f: impl FnOnce(&mut T) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let mut init = Some(init);
        let mut f = Some(f);
        let mut outcome = None;

        store.update(self.name, &mut |raw| {
            let (Some(init), Some(f)) = (init.take(), f.take()) else {
                return Err(CoreError::Internal(format!(
                    "update callback for '{}' ran twice",
                    self.name
                )));
            };
            let mut value = raw.and_then(|raw| self.decode(raw)).unwrap_or_else(init);
            outcome = Some(f(&mut value)?);
            self.encode(&value).map(Some)
        })?;

        debug!(key = self.name, "updated value");
        outcome.ok_or_else(|| CoreError::Internal(format!("update of '{}' did not run", self.name)))
    }

    /// Atomic read-modify-write that only touches a readable stored
    /// value. Returns `None`, writing nothing, when the key is absent
    /// or malformed.
    pub fn modify_existing<R>(
        self,
        store: &dyn KeyValueStore,
        f: impl FnOnce(&mut T) -> Result<R, CoreError>,
    ) -> Result<Option<R>, CoreError> {
        let mut f = Some(f);
        let mut outcome = None;

        store.update(self.name, &mut |raw| {
            let Some(mut value) = raw.and_then(|raw| self.decode(raw)) else {
                return Ok(raw.map(str::to_owned));
            };
            let Some(f) = f.take() else {
                return Err(CoreError::Internal(format!(
                    "update callback for '{}' ran twice",
                    self.name
                )));
            };
            outcome = Some(f(&mut value)?);
            self.encode(&value).map(Some)
        })?;

        Ok(outcome)
    }

    fn decode(self, raw: &str) -> Option<T> {
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = self.name, error = %e, "ignoring malformed stored value");
                None
            }
        }
    }

    fn encode(self, value: &T) -> Result<String, CoreError> {
        serde_json::to_string(value).map_err(|e| CoreError::serialization(self.name, e))
    }
}

impl<T: Serialize + DeserializeOwned + Default> Key<T> {
    /// Read the value, falling back to `T::default()`.
    pub fn load_or_default(self, store: &dyn KeyValueStore) -> Result<T, CoreError> {
        Ok(self.load(store)?.unwrap_or_default())
    }

    /// [`modify`](Self::modify) starting from `T::default()` when absent.
    pub fn modify_or_default<R>(
        self,
        store: &dyn KeyValueStore,
        f: impl FnOnce(&mut T) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        self.modify(store, T::default, f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const NUMBERS: Key<Vec<u32>> = Key::new("numbers");

    #[test]
    fn malformed_json_reads_as_absent() {
        let store = MemoryStore::new();
        store.put("numbers", "{not json".into()).unwrap();
        assert!(NUMBERS.load(&store).unwrap().is_none());
        assert!(NUMBERS.load_or_default(&store).unwrap().is_empty());
    }

    #[test]
    fn modify_starts_from_default_and_persists() {
        let store = MemoryStore::new();
        let len = NUMBERS
            .modify_or_default(&store, |v| {
                v.push(7);
                Ok(v.len())
            })
            .unwrap();
        assert_eq!(len, 1);
        assert_eq!(store.get("numbers").unwrap().as_deref(), Some("[7]"));
    }

    #[test]
    fn failed_modify_writes_nothing() {
        let store = MemoryStore::new();
        NUMBERS.save(&store, &vec![1, 2]).unwrap();
        let result: Result<(), _> = NUMBERS.modify_or_default(&store, |v| {
            v.clear();
            Err(CoreError::Internal("nope".into()))
        });
        assert!(result.is_err());
        assert_eq!(NUMBERS.load(&store).unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn modify_existing_leaves_absent_key_absent() {
        let store = MemoryStore::new();
        let outcome = NUMBERS.modify_existing(&store, |v| {
            v.push(1);
            Ok(v.len())
        });
        assert_eq!(outcome.unwrap(), None);
        assert!(store.get("numbers").unwrap().is_none());

        NUMBERS.save(&store, &vec![4]).unwrap();
        let len = NUMBERS
            .modify_existing(&store, |v| {
                v.push(5);
                Ok(v.len())
            })
            .unwrap();
        assert_eq!(len, Some(2));
        assert_eq!(NUMBERS.load(&store).unwrap(), Some(vec![4, 5]));
    }
}
