//! Key-value backing stores for the few persisted settings.

use crate::config::error::PreferencesError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock};

/// Platform key-value store.
pub trait PreferencesStore: Send + Sync {
    fn get_all(&self) -> Result<HashMap<String, String>, PreferencesError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError>;

    fn delete(&self, key: &str) -> Result<(), PreferencesError>;

    fn clear(&self) -> Result<(), PreferencesError>;

    fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        Ok(self.get_all()?.remove(key))
    }
}

/// Process-lifetime store; values are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferencesStore for MemoryPreferences {
    fn get_all(&self) -> Result<HashMap<String, String>, PreferencesError> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        Ok(values.clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), PreferencesError> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), PreferencesError> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.clear();
        Ok(())
    }
}

/// Store persisted as a flat JSON object in a single file.
///
/// A missing file reads as empty. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> Result<HashMap<String, String>, PreferencesError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, values: &HashMap<String, String>) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(values)?)?;
        Ok(())
    }

    fn modify(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>),
    ) -> Result<(), PreferencesError> {
        let _guard = self.guard();
        let mut values = self.read()?;
        f(&mut values);
        self.write(&values)
    }
}

impl PreferencesStore for FilePreferences {
    fn get_all(&self) -> Result<HashMap<String, String>, PreferencesError> {
        let _guard = self.guard();
        self.read()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.modify(|values| {
            values.insert(key.to_owned(), value.to_owned());
        })
    }

    fn delete(&self, key: &str) -> Result<(), PreferencesError> {
        self.modify(|values| {
            values.remove(key);
        })
    }

    fn clear(&self) -> Result<(), PreferencesError> {
        self.modify(|values| values.clear())
    }
}
