//! Pool lookups

use crate::client::Client;
use crate::domain::ports::ApiRequest;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pool {
    pub id: i64,
    pub name: String,
    pub physical_capacity: u64,
    pub virtual_capacity: u64,
    pub free_physical_space: u64,
    pub free_virtual_space: u64,
    pub ssd_enabled: bool,
    pub compression_enabled: bool,
    pub volumes_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
}

impl Client {
    pub async fn get_pool(&self, pool_id: i64) -> Result<Pool> {
        let request = ApiRequest::get(format!("pools/{}", pool_id));
        self.call("getting pool", &pool_id.to_string(), request).await
    }

    pub async fn get_pool_by_name(&self, name: &str) -> Result<Pool> {
        self.find_one("pool", "pools", name).await
    }

    pub async fn list_pools(&self) -> Result<Vec<Pool>> {
        self.list("pools").await
    }
}
