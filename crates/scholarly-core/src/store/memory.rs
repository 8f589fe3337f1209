// ── In-memory store ──
//
// Concurrent map with per-shard locking. `update` holds the shard's
// write lock for the whole read-modify-write.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{KeyValueStore, UpdateFn};
use crate::error::CoreError;

/// A process-local store. Contents vanish when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.get(key).map(|r| r.value().clone()))
    }

    fn put(&self, key: &str, value: String) -> Result<(), CoreError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, CoreError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.entries.iter().map(|r| r.key().clone()).collect())
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<(), CoreError> {
        match self.entries.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => match f(Some(occupied.get().as_str()))? {
                Some(value) => {
                    occupied.insert(value);
                }
                None => {
                    occupied.remove();
                }
            },
            Entry::Vacant(vacant) => {
                if let Some(value) = f(None)? {
                    vacant.insert(value);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn put_get_delete() {
        let store = MemoryStore::new();
        store.put("a", "1".into()).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert!(store.get("a").unwrap().is_none());
    }

    #[test]
    fn update_can_create_replace_and_remove() {
        let store = MemoryStore::new();
        store.update("n", &mut |cur| {
            assert!(cur.is_none());
            Ok(Some("1".into()))
        })
        .unwrap();
        store
            .update("n", &mut |cur| Ok(cur.map(|v| format!("{v}1"))))
            .unwrap();
        assert_eq!(store.get("n").unwrap().as_deref(), Some("11"));
        assert_eq!(store.len(), 1);

        store.update("n", &mut |_| Ok(None)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn failed_update_leaves_value_untouched() {
        let store = MemoryStore::new();
        store.put("k", "keep".into()).unwrap();
        let result = store.update("k", &mut |_| Err(CoreError::Internal("boom".into())));
        assert!(result.is_err());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("keep"));
    }

    #[test]
    fn concurrent_updates_do_not_lose_writes() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .update("counter", &mut |cur| {
                                let n: u32 = cur.map_or(0, |v| v.parse().unwrap());
                                Ok(Some((n + 1).to_string()))
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get("counter").unwrap().as_deref(), Some("800"));
    }
}
