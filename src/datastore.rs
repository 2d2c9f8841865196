use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};

// Handle to whatever optional data store a deployment wires in. Only the
// /test diagnostics touch this; the talk path never does.
#[async_trait]
pub trait DataStore: Send + Sync {
    fn name(&self) -> &str;

    async fn list_collections(&self) -> Result<Vec<String>>;
}

// Resolved once at startup from configuration. Replaces runtime probing:
// the diagnostics handler pattern-matches this capability instead of
// attempting any load or connection of its own.
pub enum DataStoreCapability {
    Absent,
    Uninitialized,
    // Constructed by builds that compile in a concrete connector; the
    // default build ships none.
    #[allow(dead_code)]
    Ready(Arc<dyn DataStore>),
}

impl DataStoreCapability {
    // DATA_STORE_BACKEND declares intent to wire a store. No connector is
    // compiled into this build, so a declared backend resolves to
    // Uninitialized and /test reports it that way.
    pub fn resolve(backend: Option<&str>) -> Self {
        match backend {
            None => {
                info!("No data store backend declared; /test will report it as not found");
                DataStoreCapability::Absent
            }
            Some(name) => {
                warn!(
                    "Data store backend '{}' declared, but no connector is compiled in",
                    name
                );
                DataStoreCapability::Uninitialized
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_declared_backend_resolves_to_absent() {
        assert!(matches!(
            DataStoreCapability::resolve(None),
            DataStoreCapability::Absent
        ));
    }

    #[test]
    fn declared_backend_without_connector_is_uninitialized() {
        assert!(matches!(
            DataStoreCapability::resolve(Some("mongodb")),
            DataStoreCapability::Uninitialized
        ));
    }
}
