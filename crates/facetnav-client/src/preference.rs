//! Remembered user preferences.
//!
//! Some pages remember a value across visits (the user id on the
//! recommendation page). The store itself is pluggable; browsers keep it in
//! a cookie, tests keep it in memory.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Key the user id is remembered under.
pub const USER_ID_KEY: &str = "userId";

/// Key-value store for remembered preferences.
pub trait PreferenceStore: Send + Sync {
    /// Stored value for `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Remember `value` under `key`.
    fn set(&self, key: &str, value: &str);

    /// Forget `key`.
    fn remove(&self, key: &str);
}

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Resolve a remembered value against the one in the URL.
///
/// A non-blank URL value wins and replaces the stored one. Otherwise the
/// stored value, if any, is used.
pub fn resolve_remembered(
    store: &dyn PreferenceStore,
    key: &str,
    url_value: Option<&str>,
) -> Option<String> {
    match url_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => {
            store.set(key, value);
            Some(value.to_string())
        }
        None => {
            let stored = store.get(key).filter(|v| !v.trim().is_empty());
            if stored.is_some() {
                tracing::debug!(key, "using remembered preference");
            }
            stored
        }
    }
}
