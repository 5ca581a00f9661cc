//! Key-value configuration boundary.
//!
//! The host platform stores module settings in a versioned key-value store
//! scoped per store view. This system consumes exactly three keys: the
//! connected flag, the merchant id, and an optional API endpoint override.
//! The [`ConfigBackend`] capability trait keeps the backing store pluggable
//! (in-memory, file, the platform's own config service) and every component
//! receives its scope explicitly — there is no ambient global configuration.

use std::{
    fmt,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config key holding the connected flag, written as `"0"` / `"1"`.
pub const CONFIG_CONNECTED: &str = "channel3/general/connected";

/// Config key holding the 4-character merchant id.
pub const CONFIG_MERCHANT_ID: &str = "channel3/general/merchant_id";

/// Config key holding an optional Channel3 endpoint override, used to point
/// the connector at non-production backends.
pub const CONFIG_API_URL: &str = "channel3/general/api_url";

/// Errors from the configuration store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backing store failed to read, write, or invalidate.
    #[error("config storage failed: {0}")]
    Storage(String),
}

/// Result alias for configuration calls.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Scope a configuration value applies to.
///
/// Store-view reads fall back to the default scope when the store view has no
/// explicit value, matching the host platform's scope resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigScope {
    /// Installation-wide default scope.
    #[default]
    Default,
    /// A single store view.
    Store(u32),
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Store(id) => write!(f, "store {id}"),
        }
    }
}

/// Narrow capability over the host configuration store.
pub trait ConfigBackend: Send + Sync {
    /// Reads a value, applying store-view → default fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails; an unset key is
    /// `Ok(None)`.
    fn get(&self, key: &str, scope: ConfigScope) -> ConfigResult<Option<String>>;

    /// Writes a value at the given scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn set(&self, key: &str, value: &str, scope: ConfigScope) -> ConfigResult<()>;

    /// Invalidates any cached configuration layer so subsequent reads observe
    /// the latest writes without a process restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache layer fails.
    fn invalidate(&self) -> ConfigResult<()>;
}

/// One stored configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Scope the value applies to.
    pub scope: ConfigScope,
    /// Config key path.
    pub key: String,
    /// Stored value.
    pub value: String,
}

/// Serializable contents of a [`MemoryConfigBackend`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Stored entries.
    #[serde(default)]
    pub entries: Vec<ConfigEntry>,
}

/// In-memory configuration store with an observable invalidation counter.
#[derive(Debug, Default)]
pub struct MemoryConfigBackend {
    entries: Mutex<Vec<ConfigEntry>>,
    invalidations: AtomicU64,
}

impl MemoryConfigBackend {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a store from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: ConfigSnapshot) -> Self {
        Self { entries: Mutex::new(snapshot.entries), invalidations: AtomicU64::new(0) }
    }

    /// Returns a copy of the stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the entry mutex was poisoned by a panicking thread.
    #[must_use]
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot { entries: self.entries.lock().expect("config entries poisoned").clone() }
    }

    /// Number of cache invalidations triggered so far.
    #[must_use]
    pub fn invalidation_count(&self) -> u64 {
        self.invalidations.load(Ordering::SeqCst)
    }

    fn lock(&self) -> ConfigResult<MutexGuard<'_, Vec<ConfigEntry>>> {
        self.entries.lock().map_err(|_| ConfigError::Storage("config entries poisoned".to_owned()))
    }
}

impl ConfigBackend for MemoryConfigBackend {
    fn get(&self, key: &str, scope: ConfigScope) -> ConfigResult<Option<String>> {
        let entries = self.lock()?;
        let exact = entries
            .iter()
            .find(|entry| entry.scope == scope && entry.key == key)
            .map(|entry| entry.value.clone());

        if exact.is_some() || scope == ConfigScope::Default {
            return Ok(exact);
        }

        Ok(entries
            .iter()
            .find(|entry| entry.scope == ConfigScope::Default && entry.key == key)
            .map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: &str, scope: ConfigScope) -> ConfigResult<()> {
        let mut entries = self.lock()?;
        match entries.iter_mut().find(|entry| entry.scope == scope && entry.key == key) {
            Some(entry) => value.clone_into(&mut entry.value),
            None => entries.push(ConfigEntry {
                scope,
                key: key.to_owned(),
                value: value.to_owned(),
            }),
        }
        Ok(())
    }

    fn invalidate(&self) -> ConfigResult<()> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_unset_key() {
        let backend = MemoryConfigBackend::new();
        assert!(backend.get(CONFIG_CONNECTED, ConfigScope::Default).unwrap().is_none());
    }

    #[test]
    fn test_set_then_get_same_scope() {
        let backend = MemoryConfigBackend::new();
        backend.set(CONFIG_MERCHANT_ID, "AB12", ConfigScope::Store(1)).unwrap();
        assert_eq!(
            backend.get(CONFIG_MERCHANT_ID, ConfigScope::Store(1)).unwrap().as_deref(),
            Some("AB12")
        );
    }

    #[test]
    fn test_store_scope_falls_back_to_default() {
        let backend = MemoryConfigBackend::new();
        backend.set(CONFIG_API_URL, "https://staging.trychannel3.com", ConfigScope::Default).unwrap();

        assert_eq!(
            backend.get(CONFIG_API_URL, ConfigScope::Store(3)).unwrap().as_deref(),
            Some("https://staging.trychannel3.com")
        );
    }

    #[test]
    fn test_store_scope_value_shadows_default() {
        let backend = MemoryConfigBackend::new();
        backend.set(CONFIG_MERCHANT_ID, "AAAA", ConfigScope::Default).unwrap();
        backend.set(CONFIG_MERCHANT_ID, "BBBB", ConfigScope::Store(2)).unwrap();

        assert_eq!(
            backend.get(CONFIG_MERCHANT_ID, ConfigScope::Store(2)).unwrap().as_deref(),
            Some("BBBB")
        );
        assert_eq!(
            backend.get(CONFIG_MERCHANT_ID, ConfigScope::Default).unwrap().as_deref(),
            Some("AAAA")
        );
    }

    #[test]
    fn test_default_read_never_falls_back_to_store() {
        let backend = MemoryConfigBackend::new();
        backend.set(CONFIG_CONNECTED, "1", ConfigScope::Store(1)).unwrap();
        assert!(backend.get(CONFIG_CONNECTED, ConfigScope::Default).unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let backend = MemoryConfigBackend::new();
        backend.set(CONFIG_CONNECTED, "1", ConfigScope::Default).unwrap();
        backend.set(CONFIG_CONNECTED, "0", ConfigScope::Default).unwrap();

        assert_eq!(backend.get(CONFIG_CONNECTED, ConfigScope::Default).unwrap().as_deref(), Some("0"));
        assert_eq!(backend.snapshot().entries.len(), 1);
    }

    #[test]
    fn test_invalidation_counter() {
        let backend = MemoryConfigBackend::new();
        assert_eq!(backend.invalidation_count(), 0);
        backend.invalidate().unwrap();
        backend.invalidate().unwrap();
        assert_eq!(backend.invalidation_count(), 2);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let backend = MemoryConfigBackend::new();
        backend.set(CONFIG_MERCHANT_ID, "WXYZ", ConfigScope::Store(1)).unwrap();

        let restored = MemoryConfigBackend::from_snapshot(backend.snapshot());
        assert_eq!(
            restored.get(CONFIG_MERCHANT_ID, ConfigScope::Store(1)).unwrap().as_deref(),
            Some("WXYZ")
        );
    }
}
