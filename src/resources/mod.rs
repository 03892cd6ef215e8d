//! Resource collaborators
//!
//! Typed records and single-call operations for volumes, hosts, host
//! clusters, pools and tenants. They are thin users of the core: every call
//! goes through [`Client::call`](crate::Client::call) or the query builder.

pub mod host;
pub mod host_cluster;
pub mod initiator;
pub mod lun;
pub mod pool;
pub mod tenant;
pub mod volume;

pub use host::{Host, Port};
pub use host_cluster::HostCluster;
pub use initiator::{Initiator, InitiatorTarget};
pub use lun::Lun;
pub use pool::Pool;
pub use tenant::Tenant;
pub use volume::{DeleteOptions, NewVolume, Volume};
