//! Query Builder
//!
//! Filtered collection lookups (`field=op:value`) and whole-collection
//! listing. Lookups return the raw `result` payload; deciding whether an empty
//! answer means "not found" belongs to the resource layer.

use crate::client::{decode_result, Client};
use crate::domain::ports::{ApiRequest, ScopeStyle};
use crate::error::{Error, Result};
use crate::protocol::field::Field;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Filter operators understood by the management API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    In,
}

impl std::fmt::Display for QueryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            QueryOp::Eq => "eq",
            QueryOp::Ne => "ne",
            QueryOp::Lt => "lt",
            QueryOp::Le => "le",
            QueryOp::Gt => "gt",
            QueryOp::Ge => "ge",
            QueryOp::Like => "like",
            QueryOp::In => "in",
        };
        f.write_str(code)
    }
}

impl std::str::FromStr for QueryOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "eq" => Ok(QueryOp::Eq),
            "ne" => Ok(QueryOp::Ne),
            "lt" => Ok(QueryOp::Lt),
            "le" => Ok(QueryOp::Le),
            "gt" => Ok(QueryOp::Gt),
            "ge" => Ok(QueryOp::Ge),
            "like" => Ok(QueryOp::Like),
            "in" => Ok(QueryOp::In),
            other => Err(Error::Configuration(format!("unknown query operator: {}", other))),
        }
    }
}

impl Client {
    /// Look up `collection` records whose `field` matches `op:value`
    ///
    /// Returns `Ok(None)` when nothing matched (`number_of_objects == 0` or no
    /// result payload). The payload is left undecoded.
    #[instrument(skip(self))]
    pub async fn find(
        &self,
        collection: &str,
        field: &str,
        op: QueryOp,
        value: &str,
    ) -> Result<Option<Value>> {
        let target = format!("{} {}={}:{}", collection, field, op, value);

        if let Some(scope) = self.tenant() {
            debug!("Adding tenant_id {} to request", scope);
        }
        let request = ApiRequest::get(collection)
            .scoped(self.tenant(), ScopeStyle::Query)
            .query(field, format!("{}:{}", op, value));

        let envelope = self.execute("finding", &target, request).await?;

        if envelope.number_of_objects() == Field::Present(0) {
            debug!("no {} matched {}", collection, target);
            return Ok(None);
        }

        Ok(envelope.result.filter(|raw| !raw.is_null()))
    }

    /// Resource-layer get-by-name: first `collection` record named `name`
    pub async fn find_one<T: DeserializeOwned>(
        &self,
        kind: &str,
        collection: &str,
        name: &str,
    ) -> Result<T> {
        let raw = self.find(collection, "name", QueryOp::Eq, name).await?;

        let raw = match raw {
            Some(raw) => raw,
            None => return Err(not_found(kind, name)),
        };

        let mut records: Vec<T> = decode_result("decoding query result for", name, raw)?;
        if records.is_empty() {
            return Err(not_found(kind, name));
        }
        Ok(records.swap_remove(0))
    }

    /// Fetch a whole collection
    ///
    /// The collection response must carry `metadata.number_of_objects`; an
    /// empty collection yields an empty vector.
    #[instrument(skip(self))]
    pub async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        debug!("Getting {} collection", collection);

        let request = ApiRequest::get(collection).scoped(self.tenant(), ScopeStyle::Header);
        let envelope = self.execute("listing", collection, request).await?;

        match envelope.number_of_objects() {
            Field::Present(0) => {
                info!("{} collection is empty", collection);
                return Ok(Vec::new());
            }
            Field::Present(_) => {}
            Field::Absent | Field::Malformed(_) => {
                return Err(Error::MalformedEnvelope {
                    operation: "listing".into(),
                    target: collection.into(),
                    cause: "cannot parse metadata for number_of_objects field".into(),
                });
            }
        }

        let records = decode_result("listing", collection, envelope.result.unwrap_or(Value::Null))?;
        debug!("Got {} collection", collection);
        Ok(records)
    }
}

fn not_found(kind: &str, name: &str) -> Error {
    Error::NotFound {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}
