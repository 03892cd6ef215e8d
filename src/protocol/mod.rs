//! Wire protocol of the management API
//!
//! - [`envelope`]: the `{error, metadata, result}` decoder
//! - [`field`]: three-state decode of loosely typed members

pub mod envelope;
pub mod field;

pub use envelope::{decode, ApiError, DecodeError, Envelope, Metadata};
pub use field::Field;
