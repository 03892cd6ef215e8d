//! Domain layer - Transport port and request/response values
//!
//! The core builds requests and decodes responses; adapters implement
//! [`ports::Transport`] to move them over the wire.

pub mod ports;

pub use ports::*;
