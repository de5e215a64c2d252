//! Common utilities and patterns shared across textsearch crates
//!
//! This crate provides correlation ids for tracing a single search call across
//! crate boundaries, the shared error conventions, and process initialization.

pub mod correlation;
pub mod error;
pub mod init;

pub use correlation::CorrelationId;
pub use error::CommonError;
pub use init::{TracingOptions, init_tracing, initialize_environment};
