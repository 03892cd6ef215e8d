//! Per-host-cluster lock registry
//!
//! Host-cluster LUN mutations (add, list, delete) are serialized per cluster
//! id. Fetched `HostCluster` values are transient copies, so the locks live in
//! a registry shared by every clone of a [`Client`](crate::Client).

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Registry of exclusive locks keyed by host-cluster id, created on demand
#[derive(Debug, Default)]
pub struct ClusterLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl ClusterLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `cluster_id`, waiting for other holders
    pub async fn lock(&self, cluster_id: i64) -> OwnedMutexGuard<()> {
        // Clone the handle out so no map shard stays locked across the await
        let handle = self
            .locks
            .entry(cluster_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        trace!(cluster_id, "acquiring host cluster lock");
        handle.lock_owned().await
    }

    /// Number of clusters that have had a lock created
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
