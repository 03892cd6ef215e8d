//! Tenant lookups and scope resolution

use crate::client::Client;
use crate::domain::ports::TenantScope;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub short_tenant_key: i64,
    pub visible_to_sysadmin: bool,
    pub capacity: Option<serde_json::Value>,
}

impl Client {
    /// Tenants are looked up array-wide, regardless of the current scope
    pub async fn get_tenant_by_name(&self, name: &str) -> Result<Tenant> {
        self.unscoped().find_one("tenant", "tenants", name).await
    }

    /// Scope value for tenant `name`, for use with [`Client::with_tenant`]
    pub async fn resolve_tenant(&self, name: &str) -> Result<TenantScope> {
        debug!("Resolving tenant: {}", name);
        let tenant = self.get_tenant_by_name(name).await?;
        debug!("Setting tenant id to: {}", tenant.id);
        Ok(TenantScope::new(tenant.id.to_string()))
    }
}
