//! Transport Adapters
//!
//! Implementations of [`Transport`](crate::domain::ports::Transport):
//! - [`http`]: reqwest-backed HTTPS transport used against real arrays

pub mod http;

pub use http::HttpTransport;
