//! Profiling cache
//!
//! Signals keyed by table name. Owned by whoever constructs it and handed
//! to the analyzer explicitly; invalidation is the caller's call.

use crate::profiling::TableSignals;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Thread-safe, cheaply cloneable signal cache
#[derive(Clone, Default)]
pub struct ProfilingCache {
    entries: Arc<RwLock<HashMap<String, TableSignals>>>,
}

fn key(table_name: &str) -> String {
    table_name.trim().to_lowercase()
}

impl ProfilingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, table_name: &str) -> Option<TableSignals> {
        let entries = self.entries.read().await;
        entries.get(&key(table_name)).cloned()
    }

    /// Store signals, replacing any previous entry for the table
    pub async fn insert(&self, signals: TableSignals) {
        let mut entries = self.entries.write().await;
        entries.insert(key(&signals.table_name), signals);
    }

    /// Drop one table's entry. Returns whether anything was removed.
    pub async fn invalidate(&self, table_name: &str) -> bool {
        let mut entries = self.entries.write().await;
        let removed = entries.remove(&key(table_name)).is_some();
        if removed {
            info!("Invalidated profiling signals for '{}'", table_name);
        }
        removed
    }

    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        count
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
