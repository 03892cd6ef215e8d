//! Domain Ports - Transport boundary for the management client
//!
//! The core never talks HTTP directly. It builds [`ApiRequest`] values and
//! hands them to a [`Transport`]; adapters implement the trait for a real
//! HTTP stack or for an in-process fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Tenant scoping header understood by the array
pub const TENANT_HEADER: &str = "X-INFINIDAT-TENANT-ID";

/// Tenant scoping query parameter understood by the array
pub const TENANT_QUERY_PARAM: &str = "tenant_id";

/// Prefix of every management endpoint
pub const API_PREFIX: &str = "api/rest";

// =============================================================================
// Request / Response
// =============================================================================

/// HTTP methods used by the management API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A request against the management API, relative to the array base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, e.g. `api/rest/volumes/10`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a request for `method` on a path below `api/rest/`
    pub fn new(method: Method, endpoint: impl AsRef<str>) -> Self {
        let endpoint = endpoint.as_ref().trim_start_matches('/');
        Self {
            method,
            path: format!("{}/{}", API_PREFIX, endpoint),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(endpoint: impl AsRef<str>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn post(endpoint: impl AsRef<str>) -> Self {
        Self::new(Method::Post, endpoint)
    }

    pub fn put(endpoint: impl AsRef<str>) -> Self {
        Self::new(Method::Put, endpoint)
    }

    pub fn delete(endpoint: impl AsRef<str>) -> Self {
        Self::new(Method::Delete, endpoint)
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Confirm a destructive operation (`approved=true`)
    pub fn approved(self) -> Self {
        self.query("approved", "true")
    }

    /// Attach the tenant scope, if any, in the form the endpoint expects
    pub fn scoped(self, scope: Option<&TenantScope>, style: ScopeStyle) -> Self {
        match scope {
            Some(scope) => match style {
                ScopeStyle::Header => self.header(TENANT_HEADER, scope.as_str()),
                ScopeStyle::Query => self.query(TENANT_QUERY_PARAM, scope.as_str()),
            },
            None => self,
        }
    }

    /// Value of the first query parameter named `key`
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first header named `name` (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP response handed to the envelope decoder
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// Full URL the request was sent to
    pub url: String,
    pub status: u16,
    /// Status line text, e.g. `500 Internal Server Error`
    pub status_text: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            status_text: status_text(status),
            body: body.into(),
        }
    }
}

fn status_text(status: u16) -> String {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    };
    format!("{} {}", status, reason).trim_end().to_string()
}

// =============================================================================
// Tenant Scope
// =============================================================================

/// Immutable multi-tenancy scope (the array's numeric tenant id as text)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantScope(String);

impl TenantScope {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an endpoint expects the tenant scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeStyle {
    /// `X-INFINIDAT-TENANT-ID` header
    Header,
    /// `tenant_id` query parameter
    Query,
}

// =============================================================================
// Transport Port
// =============================================================================

/// Connection-level failure, never originated by the array itself
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Port for sending management API requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response
    async fn send(&self, request: ApiRequest) -> std::result::Result<RawResponse, TransportError>;
}

pub type TransportRef = Arc<dyn Transport>;
