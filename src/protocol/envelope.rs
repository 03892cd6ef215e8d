//! Response Envelope Decoder
//!
//! Every management API body has the shape
//! `{"error": {...}|null, "metadata": {...}|null, "result": <any>}`.
//! [`decode`] turns a transport outcome into either an [`Envelope`] or a
//! [`DecodeError`]; it never lets a failure escape as a panic.

use crate::domain::ports::{RawResponse, TransportError};
use crate::protocol::field::Field;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, error};

/// HTTP status the array uses for faults whose body is not an envelope
pub const SERVER_FAULT_STATUS: u16 = 500;

// =============================================================================
// Envelope Types
// =============================================================================

/// Structured error record carried in the envelope `error` member
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub code: Field<String>,
    pub message: Field<String>,
    pub severity: Field<String>,
    pub reasons: Field<Vec<Value>>,
    pub is_remote: Field<bool>,
    pub data: Option<Value>,
}

impl ApiError {
    pub fn from_map(object: &Map<String, Value>) -> Self {
        Self {
            code: Field::member(object, "code"),
            message: Field::member(object, "message"),
            severity: Field::member(object, "severity"),
            reasons: Field::member(object, "reasons"),
            is_remote: Field::member(object, "is_remote"),
            data: object.get("data").filter(|v| !v.is_null()).cloned(),
        }
    }

    /// Build from an arbitrary value; non-objects yield an all-absent record
    pub fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(object) => Self::from_map(object),
            None => Self::from_map(&Map::new()),
        }
    }

    /// Error code, empty when absent or not a string
    pub fn code(&self) -> &str {
        self.code.present().map(String::as_str).unwrap_or("")
    }

    /// Error message, empty when absent or not a string
    pub fn message(&self) -> &str {
        self.message.present().map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{API ERROR CODE: {}}}, {{API ERROR MESSAGE: {}}}",
            self.code(),
            self.message()
        )
    }
}

/// Paging and readiness record carried in the envelope `metadata` member
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub ready: Field<bool>,
    pub page: Field<u64>,
    pub page_size: Field<u64>,
    pub pages_total: Field<u64>,
    pub number_of_objects: Field<u64>,
}

impl Metadata {
    pub fn from_map(object: &Map<String, Value>) -> Self {
        Self {
            ready: Field::member(object, "ready"),
            page: Field::member(object, "page"),
            page_size: Field::member(object, "page_size"),
            pages_total: Field::member(object, "pages_total"),
            number_of_objects: Field::member(object, "number_of_objects"),
        }
    }
}

/// Decoded response envelope of a successful call
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub metadata: Option<Metadata>,
    /// Opaque payload, decoded by the caller; `None` when absent or `null`
    pub result: Option<Value>,
}

impl Envelope {
    /// `metadata.number_of_objects`, absent when there is no metadata at all
    pub fn number_of_objects(&self) -> Field<u64> {
        self.metadata
            .as_ref()
            .map(|m| m.number_of_objects.clone())
            .unwrap_or(Field::Absent)
    }
}

#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    error: Option<Map<String, Value>>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
    #[serde(default)]
    result: Option<Value>,
}

// =============================================================================
// Decoder
// =============================================================================

/// Why a response did not yield an envelope
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("{status_text}")]
    RemoteFault { status: u16, status_text: String },

    #[error("malformed envelope: {cause}")]
    Malformed { cause: String },

    #[error("panic occurred while parsing management api response {detail} for request {url}")]
    Panicked { url: String, detail: String },

    #[error("{0}")]
    RemoteApi(ApiError),
}

/// Decode a transport outcome into a response envelope
pub fn decode(
    outcome: std::result::Result<RawResponse, TransportError>,
) -> std::result::Result<Envelope, DecodeError> {
    decode_with(outcome, inspect)
}

fn decode_with<F>(
    outcome: std::result::Result<RawResponse, TransportError>,
    inspect: F,
) -> std::result::Result<Envelope, DecodeError>
where
    F: FnOnce(&RawResponse) -> std::result::Result<Envelope, DecodeError>,
{
    let response = outcome?;

    match panic::catch_unwind(AssertUnwindSafe(|| inspect(&response))) {
        Ok(decoded) => decoded,
        Err(payload) => {
            let detail = panic_detail(payload.as_ref());
            error!(url = %response.url, "panic while decoding response: {}", detail);
            Err(DecodeError::Panicked {
                url: response.url.clone(),
                detail,
            })
        }
    }
}

fn inspect(response: &RawResponse) -> std::result::Result<Envelope, DecodeError> {
    if response.status == SERVER_FAULT_STATUS {
        return Err(DecodeError::RemoteFault {
            status: response.status,
            status_text: response.status_text.clone(),
        });
    }

    let wire: WireEnvelope = serde_json::from_slice(&response.body).map_err(|e| {
        error!(url = %response.url, "error unmarshalling response body to envelope: {}", e);
        DecodeError::Malformed {
            cause: e.to_string(),
        }
    })?;

    // An error record wins over any result that came with it
    if let Some(error) = wire.error {
        let api = ApiError::from_map(&error);
        debug!(url = %response.url, code = api.code(), "envelope carries api error");
        return Err(DecodeError::RemoteApi(api));
    }

    Ok(Envelope {
        metadata: wire.metadata.as_ref().map(Metadata::from_map),
        result: wire.result,
    })
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
