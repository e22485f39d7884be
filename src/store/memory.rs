//! In-memory port store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{Port, Ports};
use crate::error::{Error, Result};
use crate::store::PortStore;

/// Port store backed by a plain hash map. Used by the server binary when no
/// external backend is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Port>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ports currently stored.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl PortStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Port> {
        self.data
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(Error::PortNotFound)
    }

    async fn bulk_upsert(&self, ports: Ports) -> Result<()> {
        debug!(count = ports.len(), "upserting ports into memory store");

        let mut data = self.data.write().await;
        for port in ports {
            data.insert(port.id.clone(), port);
        }

        Ok(())
    }
}

#[cfg(test)]
mod memory_spec {
    use super::MemoryStore;
    use crate::domain::Port;
    use crate::error::Error;
    use crate::store::PortStore;

    fn port(id: &str, name: &str) -> Port {
        Port {
            id: id.into(),
            name: name.into(),
            ..Port::default()
        }
    }

    #[tokio::test]
    async fn get_on_missing_id_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.get("AEAJM").await, Err(Error::PortNotFound)));
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);

        store
            .bulk_upsert(vec![port("AEAJM", "Ajman"), port("AEAUH", "Abu Dhabi")])
            .await
            .unwrap();
        store
            .bulk_upsert(vec![port("AEAJM", "Ajman (updated)")])
            .await
            .unwrap();

        assert!(!store.is_empty().await);
        assert_eq!(2, store.len().await);
        assert_eq!("Ajman (updated)", store.get("AEAJM").await.unwrap().name);
        assert_eq!("Abu Dhabi", store.get("AEAUH").await.unwrap().name);
    }
}
