//! Detachment Orchestrator
//!
//! Makes a volume safe to delete by removing every LUN mapping that
//! references it:
//!
//! 1. Re-fetch the volume; nothing to do when it is not mapped.
//! 2. Remove cluster-owned mappings through their host cluster endpoint.
//! 3. Re-fetch the LUN set and remove the remaining host mappings. A
//!    mapping still owned by a host cluster at this point is never deleted
//!    through a host endpoint; it fails the workflow instead.
//!
//! Calls are strictly sequential. The first failed deletion aborts the
//! workflow with [`Error::PartialDetachment`]; mappings already removed stay
//! removed, so the operation can simply be run again.

use crate::client::Client;
use crate::error::{Error, MappingOwner, Result};
use crate::resources::{Lun, Volume};
use tracing::{debug, info, instrument, warn};

impl Client {
    /// Remove every LUN mapping referencing `volume`
    #[instrument(skip(self, volume), fields(volume = %volume.name, volume_id = volume.id))]
    pub async fn unmap(&self, volume: &Volume) -> Result<()> {
        debug!("Unmapping volume: {} luns", volume.name);

        let current = self.get_volume(volume.id).await?;
        if !current.mapped {
            info!("volume {} is not mapped", volume.name);
            return Ok(());
        }

        let mut removed = 0usize;

        let luns = self.volume_luns(&current).await?;
        for lun in luns.iter().filter(|l| l.is_cluster_owned()) {
            info!("unmapping host cluster LUN {:?} from volume {}", lun, volume.name);
            let owner = MappingOwner::HostCluster(lun.host_cluster_id);
            self.delete_cluster_lun(lun.host_cluster_id, lun.lun)
                .await
                .map_err(|source| partial(volume, owner, lun, removed, source))?;
            removed += 1;
            info!("unmapped host cluster LUN {:?} from volume {}", lun, volume.name);
        }

        // The cluster pass may have changed the set
        let luns = self.volume_luns(&current).await?;
        for lun in &luns {
            if lun.is_cluster_owned() {
                warn!(
                    "LUN {:?} of volume {} is still mapped through host cluster {} after cluster pass",
                    lun, volume.name, lun.host_cluster_id
                );
                let owner = MappingOwner::HostCluster(lun.host_cluster_id);
                let source = Error::StillClusterOwned {
                    volume: volume.name.clone(),
                    cluster_id: lun.host_cluster_id,
                    lun: lun.lun,
                };
                return Err(partial(volume, owner, lun, removed, source));
            }
            info!("unmapping host LUN {:?} from volume {}", lun, volume.name);
            let owner = MappingOwner::Host(lun.host_id);
            self.delete_host_lun(lun.host_id, lun.lun)
                .await
                .map_err(|source| partial(volume, owner, lun, removed, source))?;
            removed += 1;
            info!("unmapped host LUN {:?} from volume {}", lun, volume.name);
        }

        debug!("Successfully unmapped volume {} ({} mappings removed)", volume.name, removed);
        Ok(())
    }
}

fn partial(volume: &Volume, mapping: MappingOwner, lun: &Lun, removed: usize, source: Error) -> Error {
    Error::PartialDetachment {
        volume: volume.name.clone(),
        mapping,
        lun: lun.lun,
        removed,
        source: Box::new(source),
    }
}
