//! Host cluster operations
//!
//! LUN add/list/delete on a cluster hold that cluster's lock from the
//! client's [`ClusterLocks`](crate::client::ClusterLocks) registry for the
//! duration of the remote call.

use crate::client::Client;
use crate::domain::ports::ApiRequest;
use crate::error::Result;
use crate::resources::host::lun_body;
use crate::resources::{Host, Lun};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCluster {
    pub id: i64,
    pub name: String,
    pub host_type: String,
    pub san_client_type: String,
    pub hosts: Vec<Host>,
    pub luns: Vec<Lun>,
    pub created_at: u64,
    pub updated_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
}

impl Client {
    pub async fn get_host_cluster(&self, cluster_id: i64) -> Result<HostCluster> {
        let request = ApiRequest::get(format!("clusters/{}", cluster_id));
        self.call("getting host cluster", &cluster_id.to_string(), request).await
    }

    pub async fn get_host_cluster_by_name(&self, name: &str) -> Result<HostCluster> {
        debug!("querying host cluster by name: {}", name);
        self.find_one("host cluster", "clusters", name).await
    }

    pub async fn list_host_clusters(&self) -> Result<Vec<HostCluster>> {
        self.list("clusters").await
    }

    /// Member hosts of `cluster`
    pub async fn cluster_hosts(&self, cluster: &HostCluster) -> Result<Vec<Host>> {
        debug!("Getting host cluster: {} hosts", cluster.name);
        let request = ApiRequest::get(format!("clusters/{}/hosts", cluster.id));
        let hosts: Option<Vec<Host>> = self
            .call("getting hosts of host cluster", &cluster.name, request)
            .await?;
        debug!("Successfully fetched host cluster {} hosts", cluster.name);
        Ok(hosts.unwrap_or_default())
    }

    pub async fn cluster_luns(&self, cluster_id: i64) -> Result<Vec<Lun>> {
        let _guard = self.cluster_locks().lock(cluster_id).await;

        let request = ApiRequest::get(format!("clusters/{}/luns", cluster_id));
        let luns: Option<Vec<Lun>> = self
            .call("getting luns of host cluster", &cluster_id.to_string(), request)
            .await?;

        debug!("Successfully fetched host cluster {} LUNs", cluster_id);
        Ok(luns.unwrap_or_default())
    }

    pub async fn map_volume_to_cluster(&self, cluster_id: i64, volume_id: i64, lun: Option<i64>) -> Result<Lun> {
        debug!("Adding volume_id: {} as lun to host cluster: {}", volume_id, cluster_id);
        let _guard = self.cluster_locks().lock(cluster_id).await;

        let request = ApiRequest::post(format!("clusters/{}/luns", cluster_id))
            .approved()
            .json(lun_body(volume_id, lun));
        let created: Lun = self
            .call("adding lun to host cluster", &cluster_id.to_string(), request)
            .await?;

        debug!("Successfully added new LUN {:?} to host cluster {}", created, cluster_id);
        Ok(created)
    }

    /// Remove LUN `lun` from host cluster `cluster_id`
    pub async fn delete_cluster_lun(&self, cluster_id: i64, lun: i64) -> Result<Lun> {
        debug!("Deleting host cluster: {} lun ID {}", cluster_id, lun);
        let _guard = self.cluster_locks().lock(cluster_id).await;

        let endpoint = format!("clusters/{}/luns/lun/{}", cluster_id, lun);
        let request = ApiRequest::delete(&endpoint).approved();
        self.call("deleting lun", &endpoint, request).await
    }
}
