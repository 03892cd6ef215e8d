//! Volume operations
//!
//! Single-call plumbing over the core, plus deletion that can detach the
//! volume first.

use crate::client::Client;
use crate::domain::ports::{ApiRequest, ScopeStyle};
use crate::error::Result;
use crate::resources::Lun;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};

/// Volume as reported by the array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Volume {
    pub id: i64,
    pub name: String,
    pub size: u64,
    pub used: u64,
    pub allocated: u64,
    pub pool_id: i64,
    pub pool_name: String,
    pub provtype: String,
    pub ssd_enabled: bool,
    pub write_protected: bool,
    pub compression_enabled: bool,
    /// Some LUN references this volume
    pub mapped: bool,
    pub parent_id: i64,
    pub family_id: i64,
    pub depth: i64,
    pub has_children: bool,
    pub serial: String,
    #[serde(rename = "type")]
    pub volume_type: String,
    pub created_at: u64,
    pub updated_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
}

/// Parameters for creating a volume
#[derive(Debug, Clone)]
pub struct NewVolume {
    pub name: String,
    pub pool_id: i64,
    pub size: u64,
    /// `THIN` when not given
    pub provtype: Option<String>,
    pub write_protected: bool,
    pub ssd_enabled: bool,
}

/// Options for [`Client::delete_volume`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOptions {
    /// Remove every LUN mapping before deleting
    pub unmap: bool,
}

impl Client {
    /// Fetch a volume by id
    pub async fn get_volume(&self, volume_id: i64) -> Result<Volume> {
        debug!("Getting volume object ID: {}", volume_id);
        let request = ApiRequest::get(format!("volumes/{}", volume_id));
        self.call("getting volume", &volume_id.to_string(), request).await
    }

    /// Fetch a volume by name
    pub async fn get_volume_by_name(&self, name: &str) -> Result<Volume> {
        let volume: Volume = self.find_one("volume", "volumes", name).await?;
        debug!("Found volume {:?}", volume);
        Ok(volume)
    }

    pub async fn list_volumes(&self) -> Result<Vec<Volume>> {
        self.list("volumes").await
    }

    #[instrument(skip(self, spec), fields(volume = %spec.name))]
    pub async fn create_volume(&self, spec: &NewVolume) -> Result<Volume> {
        debug!("Creating volume");

        let request = ApiRequest::post("volumes")
            .scoped(self.tenant(), ScopeStyle::Header)
            .json(json!({
                "name": spec.name,
                "pool_id": spec.pool_id,
                "size": spec.size,
                "provtype": spec.provtype.as_deref().unwrap_or("THIN"),
                "write_protected": spec.write_protected,
                "ssd_enabled": spec.ssd_enabled,
            }));
        let volume: Volume = self.call("creating volume", &spec.name, request).await?;

        info!("Successfully created volume {} (id {})", volume.name, volume.id);
        Ok(volume)
    }

    /// LUN mappings currently referencing `volume`
    pub async fn volume_luns(&self, volume: &Volume) -> Result<Vec<Lun>> {
        debug!("Getting volume: {} luns", volume.name);
        let request = ApiRequest::get(format!("volumes/{}/luns", volume.id));
        let luns: Option<Vec<Lun>> = self
            .call("getting luns of volume", &volume.name, request)
            .await?;
        Ok(luns.unwrap_or_default())
    }

    pub async fn rename_volume(&self, volume: &Volume, name: &str) -> Result<Volume> {
        debug!("Renaming volume {} to {}", volume.name, name);
        let request = ApiRequest::put(format!("volumes/{}", volume.id)).json(json!({"name": name}));
        self.call("renaming volume", &volume.name, request).await
    }

    /// Create a snapshot child of `volume`, auto-named when `name` is `None`
    pub async fn snapshot_volume(&self, volume: &Volume, name: Option<&str>) -> Result<Volume> {
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("auto-snapshot-{}", uuid::Uuid::new_v4()),
        };
        debug!("Creating snapshot {} of volume {}", name, volume.name);

        let request =
            ApiRequest::post("volumes").json(json!({"parent_id": volume.id, "name": name}));
        let snapshot: Volume = self.call("creating snapshot of volume", &volume.name, request).await?;

        info!("Successfully created snapshot {} for volume {}", snapshot.name, volume.name);
        Ok(snapshot)
    }

    /// Delete a volume, optionally detaching it from all hosts first
    #[instrument(skip(self, volume), fields(volume = %volume.name))]
    pub async fn delete_volume(&self, volume: &Volume, options: DeleteOptions) -> Result<()> {
        if options.unmap {
            self.unmap(volume).await?;
        }

        let request = ApiRequest::delete(format!("volumes/{}", volume.id)).approved();
        let _: Volume = self.call("deleting volume", &volume.name, request).await?;

        info!("Successfully deleted volume {}", volume.name);
        Ok(())
    }
}
