//! Error types for the InfiniBox management client
//!
//! Every failure path (transport, remote fault, malformed envelope, remote API
//! error, result-shape mismatch, detachment abort) is normalized into
//! [`Error`]. Each message carries the operation and the target resource so
//! failures are traceable without further context.

use crate::domain::ports::TransportError;
use crate::protocol::envelope::DecodeError;
use std::fmt;
use thiserror::Error;

/// Unified error type for the client
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Protocol Errors
    // =========================================================================
    #[error("{operation} {target}: transport failure: {source}")]
    Transport {
        operation: String,
        target: String,
        #[source]
        source: TransportError,
    },

    #[error("{operation} {target}: remote fault: {status_text}")]
    RemoteFault {
        operation: String,
        target: String,
        status: u16,
        status_text: String,
    },

    #[error("{operation} {target}: malformed envelope: {cause}")]
    MalformedEnvelope {
        operation: String,
        target: String,
        cause: String,
    },

    #[error("{operation} {target}: {{API ERROR CODE: {code}}}, {{API ERROR MESSAGE: {message}}}")]
    RemoteApi {
        operation: String,
        target: String,
        code: String,
        message: String,
    },

    // =========================================================================
    // Resource Errors
    // =========================================================================
    #[error("{kind} {name} not found")]
    NotFound { kind: String, name: String },

    #[error(
        "error unmapping volume {volume}: failed deleting {mapping} lun {lun} \
         after removing {removed} mapping(s): {source}"
    )]
    PartialDetachment {
        volume: String,
        mapping: MappingOwner,
        lun: i64,
        removed: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("lun {lun} of volume {volume} is still mapped through host cluster {cluster_id} after the cluster pass")]
    StillClusterOwned {
        volume: String,
        cluster_id: i64,
        lun: i64,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Owner of a LUN mapping, as addressed by a delete call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingOwner {
    /// Mapping owned by a host cluster
    HostCluster(i64),
    /// Mapping owned by a single host
    Host(i64),
}

impl fmt::Display for MappingOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingOwner::HostCluster(id) => write!(f, "host cluster {}", id),
            MappingOwner::Host(id) => write!(f, "host {}", id),
        }
    }
}

/// Taxonomy tag callers can match on without destructuring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TransportFailure,
    RemoteFault,
    MalformedEnvelope,
    RemoteApiError,
    NotFound,
    PartialDetachment,
    StillClusterOwned,
    Configuration,
}

impl Error {
    /// Classify a decoder failure for `operation` on `target`
    pub fn classify(
        operation: impl Into<String>,
        target: impl Into<String>,
        err: DecodeError,
    ) -> Self {
        let operation = operation.into();
        let target = target.into();
        match err {
            DecodeError::Transport(source) => Error::Transport {
                operation,
                target,
                source,
            },
            DecodeError::RemoteFault {
                status,
                status_text,
            } => Error::RemoteFault {
                operation,
                target,
                status,
                status_text,
            },
            DecodeError::Malformed { cause } => Error::MalformedEnvelope {
                operation,
                target,
                cause,
            },
            DecodeError::Panicked { url, detail } => Error::MalformedEnvelope {
                operation,
                target,
                cause: format!(
                    "panic occurred while parsing management api response {} for request {}",
                    detail, url
                ),
            },
            DecodeError::RemoteApi(api) => Error::RemoteApi {
                operation,
                target,
                code: api.code().to_string(),
                message: api.message().to_string(),
            },
        }
    }

    /// Classify a mismatch between the envelope `result` and the expected shape
    pub fn result_shape(
        operation: impl Into<String>,
        target: impl Into<String>,
        err: serde_json::Error,
    ) -> Self {
        Error::MalformedEnvelope {
            operation: operation.into(),
            target: target.into(),
            cause: format!("unable to decode result: {}", err),
        }
    }

    /// Taxonomy tag for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport { .. } => ErrorKind::TransportFailure,
            Error::RemoteFault { .. } => ErrorKind::RemoteFault,
            Error::MalformedEnvelope { .. } => ErrorKind::MalformedEnvelope,
            Error::RemoteApi { .. } => ErrorKind::RemoteApiError,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::PartialDetachment { .. } => ErrorKind::PartialDetachment,
            Error::StillClusterOwned { .. } => ErrorKind::StillClusterOwned,
            Error::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Check if this error is transient
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::RemoteFault { .. })
    }

    /// Check if re-running the failed operation can succeed without changes
    pub fn is_retryable(&self) -> bool {
        match self {
            // Re-running unmap only removes what is left
            Error::PartialDetachment { .. } => true,
            other => other.is_transient(),
        }
    }
}

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, Error>;
