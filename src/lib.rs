//! InfiniBox Client - Storage Array Management Plane
//!
//! A client for the REST management API of InfiniBox-style block storage
//! arrays: decodes the uniform response envelope, classifies remote errors,
//! and detaches volumes from every host and host cluster before deletion.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                        Resource Collaborators                               │
//! │   volumes · hosts · host clusters · pools · tenants                         │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────────┐  │
//! │  │  Query Builder  │  │   Detachment    │  │   Host Cluster Locks        │  │
//! │  │  (find / list)  │  │  Orchestrator   │  │   (per cluster id)          │  │
//! │  └────────┬────────┘  └────────┬────────┘  └─────────────────────────────┘  │
//! │           └────────────────────┤                                            │
//! │                    ┌───────────┴───────────┐                                │
//! │                    │ Envelope Decoder +    │                                │
//! │                    │ Error Classifier      │                                │
//! │                    └───────────┬───────────┘                                │
//! ├────────────────────────────────┼────────────────────────────────────────────┤
//! │                        Transport (HTTPS / fake)                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`client`]: client handle, query builder, unmap workflow, cluster locks
//! - [`protocol`]: response envelope decoder
//! - [`resources`]: typed records and single-call resource operations
//! - [`transport`]: reqwest-backed transport
//! - [`domain`]: transport port and request/response values
//! - [`config`]: client configuration
//! - [`error`]: error taxonomy

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod protocol;
pub mod resources;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use client::{Client, ClusterLocks, QueryOp};
pub use config::ClientConfig;
pub use domain::ports::{
    ApiRequest, Method, RawResponse, ScopeStyle, TenantScope, Transport, TransportError,
    TransportRef,
};
pub use error::{Error, ErrorKind, MappingOwner, Result};
pub use protocol::{decode, ApiError, DecodeError, Envelope, Field, Metadata};
pub use resources::{
    DeleteOptions, Host, HostCluster, Initiator, InitiatorTarget, Lun, NewVolume, Pool, Port, Tenant,
    Volume,
};
pub use transport::HttpTransport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
