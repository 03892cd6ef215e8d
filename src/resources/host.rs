//! Host operations

use crate::client::Client;
use crate::domain::ports::ApiRequest;
use crate::error::{Error, Result};
use crate::resources::Lun;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Initiator port registered on a host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Port {
    pub host_id: i64,
    #[serde(rename = "type")]
    pub port_type: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Host {
    pub id: i64,
    pub name: String,
    pub host_type: String,
    pub san_client_type: String,
    pub security_method: String,
    pub luns: Vec<Lun>,
    pub ports: Vec<Port>,
    pub host_cluster_id: i64,
    pub created_at: i64,
    pub updated_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
}

impl Client {
    pub async fn get_host(&self, host_id: i64) -> Result<Host> {
        debug!("Getting host object ID: {}", host_id);
        let request = ApiRequest::get(format!("hosts/{}", host_id));
        self.call("getting host", &host_id.to_string(), request).await
    }

    pub async fn get_host_by_name(&self, name: &str) -> Result<Host> {
        self.find_one("host", "hosts", name).await
    }

    pub async fn list_hosts(&self) -> Result<Vec<Host>> {
        self.list("hosts").await
    }

    /// Id of the host owning the initiator port `address`
    pub async fn host_id_by_initiator_address(&self, address: &str) -> Result<i64> {
        debug!("Getting host ID by initiator address: {}", address);

        let hosts = self.list_hosts().await?;
        let host = hosts
            .iter()
            .find(|h| h.ports.iter().any(|p| p.address == address))
            .ok_or_else(|| Error::NotFound {
                kind: "host with initiator".into(),
                name: address.into(),
            })?;

        debug!("Got host ID: {} for address {}", host.id, address);
        Ok(host.id)
    }

    pub async fn host_luns(&self, host: &Host) -> Result<Vec<Lun>> {
        debug!("Getting host: {} luns", host.name);
        let request = ApiRequest::get(format!("hosts/{}/luns", host.id));
        let luns: Option<Vec<Lun>> = self.call("getting luns of host", &host.name, request).await?;
        Ok(luns.unwrap_or_default())
    }

    /// Map `volume_id` to a host; the array picks the LUN number when `lun` is `None`
    pub async fn map_volume_to_host(&self, host: &Host, volume_id: i64, lun: Option<i64>) -> Result<Lun> {
        debug!("Adding volume_id: {} as lun to host: {}", volume_id, host.name);

        let request = ApiRequest::post(format!("hosts/{}/luns", host.id))
            .approved()
            .json(lun_body(volume_id, lun));
        let created: Lun = self.call("adding lun to host", &host.name, request).await?;

        debug!("Successfully added new LUN {:?} to host {}", created, host.name);
        Ok(created)
    }

    /// Remove LUN `lun` from host `host_id`
    pub async fn delete_host_lun(&self, host_id: i64, lun: i64) -> Result<Lun> {
        debug!("Deleting host: {} lun ID {}", host_id, lun);

        let endpoint = format!("hosts/{}/luns/lun/{}", host_id, lun);
        let request = ApiRequest::delete(&endpoint).approved();
        self.call("deleting lun", &endpoint, request).await
    }
}

pub(crate) fn lun_body(volume_id: i64, lun: Option<i64>) -> Value {
    let mut body = Map::new();
    body.insert("volume_id".into(), json!(volume_id));
    if let Some(lun) = lun.filter(|l| *l > 0) {
        body.insert("lun".into(), json!(lun));
    }
    Value::Object(body)
}
