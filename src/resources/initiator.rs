//! Initiator lookups
//!
//! Initiators are the SAN ports (WWPN / IQN) the array has seen logging in.
//! Listing takes the tenant scope as a `tenant_id` query parameter; the
//! single-address lookup takes it as a header.

use crate::client::Client;
use crate::domain::ports::{ApiRequest, ScopeStyle};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitiatorTarget {
    pub node_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Initiator {
    /// Host the initiator is registered on, 0 when unregistered
    pub host_id: i64,
    pub port_key: f64,
    #[serde(rename = "type")]
    pub initiator_type: String,
    pub targets: Vec<InitiatorTarget>,
    pub address: String,
}

impl Client {
    pub async fn list_initiators(&self) -> Result<Vec<Initiator>> {
        debug!("Getting all initiators");
        let request = ApiRequest::get("initiators").scoped(self.tenant(), ScopeStyle::Query);
        let initiators: Option<Vec<Initiator>> =
            self.call("listing", "initiators", request).await?;
        Ok(initiators.unwrap_or_default())
    }

    pub async fn get_initiator_by_address(&self, address: &str) -> Result<Initiator> {
        debug!("Getting initiator by address: {}", address);
        let request = ApiRequest::get(format!("initiators/{}", address))
            .scoped(self.tenant(), ScopeStyle::Header);
        self.call("getting initiator", address, request).await
    }
}
