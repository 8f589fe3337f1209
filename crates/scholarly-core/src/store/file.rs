// ── On-disk store ──
//
// One `<key>.json` file per key inside a data directory. Writes go to
// a temporary sibling first and are renamed into place, so a reader
// never observes a half-written file. All mutations on one `FileStore`
// are serialized by a mutex; separate processes are not coordinated.

use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{KeyValueStore, UpdateFn};
use crate::error::CoreError;

const EXTENSION: &str = "json";

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| CoreError::storage(&dir.display().to_string(), e))?;
        debug!(dir = %dir.display(), "opened file store");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(CoreError::storage(key, "key must be alphanumeric, '-', '_' or '.'"));
        }
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::storage(key, e)),
        }
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        std::fs::write(&tmp, value).map_err(|e| CoreError::storage(key, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| CoreError::storage(key, e))?;
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> Result<bool, CoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CoreError::storage(key, e)),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        self.read_raw(key)
    }

    fn put(&self, key: &str, value: String) -> Result<(), CoreError> {
        let _guard = self.lock();
        self.write_raw(key, &value)
    }

    fn delete(&self, key: &str) -> Result<bool, CoreError> {
        let _guard = self.lock();
        self.remove_raw(key)
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| CoreError::storage(&self.dir.display().to_string(), e))?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::storage(&self.dir.display().to_string(), e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_owned());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<(), CoreError> {
        let _guard = self.lock();
        let current = self.read_raw(key)?;
        match f(current.as_deref())? {
            Some(value) => self.write_raw(key, &value),
            None => self.remove_raw(key).map(|_| ()),
        }
    }
}
