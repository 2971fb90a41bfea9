//! Explicit hub registry keyed by device identifier.
//!
//! There is deliberately no ambient singleton here: construct a registry,
//! register hubs as their devices connect, and inject it into whatever needs
//! to look hubs up.

use crate::hub::HubHandle;
use std::collections::HashMap;
use uuid::Uuid;

/// Registry of live hubs, keyed by the device identifier the host's BLE
/// stack assigns to the peripheral.
#[derive(Default)]
pub struct HubRegistry {
    hubs: HashMap<Uuid, HubHandle>,
}

impl HubRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hub, returning the previous handle under the same id.
    pub fn insert(&mut self, handle: HubHandle) -> Option<HubHandle> {
        self.hubs.insert(handle.device_id(), handle)
    }

    /// Look a hub up by device identifier.
    pub fn get(&self, device_id: &Uuid) -> Option<&HubHandle> {
        self.hubs.get(device_id)
    }

    /// Remove a hub, returning its handle.
    pub fn remove(&mut self, device_id: &Uuid) -> Option<HubHandle> {
        self.hubs.remove(device_id)
    }

    /// Whether a hub is registered under the identifier.
    pub fn contains(&self, device_id: &Uuid) -> bool {
        self.hubs.contains_key(device_id)
    }

    /// Registered device identifiers.
    pub fn device_ids(&self) -> impl Iterator<Item = &Uuid> {
        self.hubs.keys()
    }

    /// Registered hub handles.
    pub fn iter(&self) -> impl Iterator<Item = &HubHandle> {
        self.hubs.values()
    }

    /// Number of registered hubs.
    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use crate::hub::Hub;
    use async_trait::async_trait;
    use bytes::Bytes;
    use hubkit_queue::{Transport, TransportError};
    use std::sync::Arc;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn write(&self, _frame: Bytes) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_insert_lookup_remove() {
        let mut registry = HubRegistry::new();
        assert!(registry.is_empty());

        let id = Uuid::new_v4();
        let (handle, _events) = Hub::spawn(id, Arc::new(NullTransport), HubConfig::default());
        assert!(registry.insert(handle).is_none());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&id));
        assert_eq!(registry.get(&id).map(HubHandle::device_id), Some(id));

        // Re-registering the same device replaces the old handle.
        let (replacement, _events) = Hub::spawn(id, Arc::new(NullTransport), HubConfig::default());
        assert!(registry.insert(replacement).is_some());
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(&id).is_some());
        assert!(registry.get(&id).is_none());
    }
}
