//! Management Client
//!
//! [`Client`] owns the shared transport handle, an immutable tenant scope and
//! the host-cluster lock registry. Every call goes through [`Client::execute`],
//! which pairs the envelope decoder with the error classifier.
//!
//! - [`query`]: filtered lookups and collection listing
//! - [`detach`]: volume unmap workflow
//! - [`locks`]: per-host-cluster lock registry

pub mod detach;
pub mod locks;
pub mod query;

pub use locks::ClusterLocks;
pub use query::QueryOp;

use crate::config::ClientConfig;
use crate::domain::ports::{ApiRequest, TenantScope, TransportRef};
use crate::error::{Error, Result};
use crate::protocol::envelope::{decode, Envelope};
use crate::transport::HttpTransport;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Client for an array's management API
#[derive(Clone)]
pub struct Client {
    transport: TransportRef,
    scope: Option<TenantScope>,
    locks: Arc<ClusterLocks>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("scope", &self.scope)
            .field("locked_clusters", &self.locks.len())
            .finish()
    }
}

impl Client {
    /// Create an unscoped client over `transport`
    pub fn new(transport: TransportRef) -> Self {
        Self {
            transport,
            scope: None,
            locks: Arc::new(ClusterLocks::new()),
        }
    }

    /// Build an HTTP client, log in, and apply the configured tenant
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let client = Client::new(Arc::new(transport));

        client.login(&config.username, &config.password).await?;

        match &config.tenant {
            Some(name) => {
                let scope = client.resolve_tenant(name).await?;
                Ok(client.with_tenant(scope))
            }
            None => Ok(client),
        }
    }

    /// Copy of this client scoped to `scope`; transport and locks are shared
    pub fn with_tenant(&self, scope: TenantScope) -> Self {
        Self {
            transport: self.transport.clone(),
            scope: Some(scope),
            locks: self.locks.clone(),
        }
    }

    /// Copy of this client without tenant scope
    pub fn unscoped(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            scope: None,
            locks: self.locks.clone(),
        }
    }

    pub fn tenant(&self) -> Option<&TenantScope> {
        self.scope.as_ref()
    }

    pub fn cluster_locks(&self) -> &ClusterLocks {
        &self.locks
    }

    /// Open a session; must precede any other call
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        debug!("Logging into array");

        let request = ApiRequest::post("users/login")
            .json(json!({"username": username, "password": password}));
        self.execute("logging in", username, request).await?;

        info!("Logged in successfully as {}", username);
        Ok(())
    }

    /// Send a request and decode its envelope, classifying any failure
    pub async fn execute(
        &self,
        operation: &str,
        target: &str,
        request: ApiRequest,
    ) -> Result<Envelope> {
        debug!("{} {}: {} {}", operation, target, request.method, request.path);

        let outcome = self.transport.send(request).await;
        decode(outcome).map_err(|e| {
            let err = Error::classify(operation, target, e);
            error!("{}", err);
            err
        })
    }

    /// Execute a request and decode the envelope `result` into `T`
    pub async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        target: &str,
        request: ApiRequest,
    ) -> Result<T> {
        let envelope = self.execute(operation, target, request).await?;
        decode_result(operation, target, envelope.result.unwrap_or(Value::Null))
    }
}

/// Decode a raw `result` payload into `T`, classifying shape mismatches
pub fn decode_result<T: DeserializeOwned>(operation: &str, target: &str, raw: Value) -> Result<T> {
    serde_json::from_value(raw).map_err(|e| {
        let err = Error::result_shape(operation, target, e);
        error!("{}", err);
        err
    })
}
