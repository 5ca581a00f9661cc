//! Durable connection state.
//!
//! Two scalar config values record whether this store view is linked to
//! Channel3. Every downstream component (tracking snippet, checkout capture,
//! the admin status page) reads only this state; only the orchestrator
//! writes it.

use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    config::{CONFIG_CONNECTED, CONFIG_MERCHANT_ID, ConfigBackend, ConfigScope},
    error::Result,
};

/// The durable local record of whether this store is linked.
///
/// Invariant: `connected` implies `merchant_id` is non-empty and was accepted
/// by the Channel3 backend in the handshake that set it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    /// Whether the store is linked.
    pub connected: bool,
    /// The 4-character merchant id, or empty when disconnected.
    pub merchant_id: String,
}

impl ConnectionState {
    /// True when the store is connected with a usable merchant id.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.connected && !self.merchant_id.is_empty()
    }
}

/// Reads and writes [`ConnectionState`] through the configuration store.
pub struct ConnectionStateStore {
    backend: Arc<dyn ConfigBackend>,
    scope: ConfigScope,
}

impl ConnectionStateStore {
    /// Creates a store bound to one configuration scope.
    #[must_use]
    pub fn new(backend: Arc<dyn ConfigBackend>, scope: ConfigScope) -> Self {
        Self { backend, scope }
    }

    /// Loads the current state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BridgeError::StateWrite`] if the backing store fails.
    pub fn load(&self) -> Result<ConnectionState> {
        let connected =
            self.backend.get(CONFIG_CONNECTED, self.scope)?.as_deref() == Some("1");
        let merchant_id =
            self.backend.get(CONFIG_MERCHANT_ID, self.scope)?.unwrap_or_default();
        Ok(ConnectionState { connected, merchant_id })
    }

    /// Marks the store connected to `merchant_id` and invalidates the config
    /// cache so tracking starts immediately.
    ///
    /// The connected flag is written before the merchant id; both writes land
    /// in the same call and no reader observes the intermediate state within
    /// a single request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BridgeError::StateWrite`] if any write or the cache
    /// invalidation fails.
    pub fn set_connected(&self, merchant_id: &str) -> Result<()> {
        self.backend.set(CONFIG_CONNECTED, "1", self.scope)?;
        self.backend.set(CONFIG_MERCHANT_ID, merchant_id, self.scope)?;
        self.backend.invalidate()?;
        debug!(merchant_id, scope = %self.scope, "connection state persisted");
        Ok(())
    }

    /// Clears the connected flag and merchant id and invalidates the config
    /// cache.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BridgeError::StateWrite`] if any write or the cache
    /// invalidation fails.
    pub fn set_disconnected(&self) -> Result<()> {
        self.backend.set(CONFIG_CONNECTED, "0", self.scope)?;
        self.backend.set(CONFIG_MERCHANT_ID, "", self.scope)?;
        self.backend.invalidate()?;
        debug!(scope = %self.scope, "connection state cleared");
        Ok(())
    }

    /// The scope this store reads and writes.
    #[must_use]
    pub fn scope(&self) -> ConfigScope {
        self.scope
    }
}

impl fmt::Debug for ConnectionStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionStateStore").field("scope", &self.scope).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigBackend;

    fn store() -> (Arc<MemoryConfigBackend>, ConnectionStateStore) {
        let backend = Arc::new(MemoryConfigBackend::new());
        let state = ConnectionStateStore::new(backend.clone(), ConfigScope::Store(1));
        (backend, state)
    }

    #[test]
    fn test_load_defaults_to_disconnected() {
        let (_, state) = store();
        let loaded = state.load().unwrap();
        assert_eq!(loaded, ConnectionState::default());
        assert!(!loaded.is_linked());
    }

    #[test]
    fn test_set_connected_persists_both_fields() {
        let (backend, state) = store();
        state.set_connected("AB12").unwrap();

        let loaded = state.load().unwrap();
        assert!(loaded.connected);
        assert_eq!(loaded.merchant_id, "AB12");
        assert!(loaded.is_linked());
        assert_eq!(backend.invalidation_count(), 1);
    }

    #[test]
    fn test_set_disconnected_clears_fields() {
        let (backend, state) = store();
        state.set_connected("AB12").unwrap();
        state.set_disconnected().unwrap();

        let loaded = state.load().unwrap();
        assert!(!loaded.connected);
        assert!(loaded.merchant_id.is_empty());
        assert_eq!(backend.invalidation_count(), 2);
    }

    #[test]
    fn test_connected_flag_is_stored_as_string() {
        let (backend, state) = store();
        state.set_connected("WXYZ").unwrap();
        assert_eq!(
            backend.get(CONFIG_CONNECTED, ConfigScope::Store(1)).unwrap().as_deref(),
            Some("1")
        );

        state.set_disconnected().unwrap();
        assert_eq!(
            backend.get(CONFIG_CONNECTED, ConfigScope::Store(1)).unwrap().as_deref(),
            Some("0")
        );
    }
}
