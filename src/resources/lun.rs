//! LUN mapping records

use serde::{Deserialize, Serialize};

/// A mapping binding a volume to a host or a host cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lun {
    pub id: i64,
    /// Target-visible LUN number
    pub lun: i64,
    /// Mapping is owned by `host_cluster_id`, not by `host_id`
    pub clustered: bool,
    pub host_cluster_id: i64,
    pub volume_id: i64,
    pub host_id: i64,
}

impl Lun {
    /// Mapping must be removed through its host cluster's endpoint
    pub fn is_cluster_owned(&self) -> bool {
        self.clustered && self.host_cluster_id != 0
    }
}
