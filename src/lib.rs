//! Whisker: cat vs. dog image classifier behind an HTTP API.
//!
//! Library root: exposes internals for integration tests. The binary entry
//! point is src/main.rs.

pub mod config;
pub mod error;
pub mod logger;
pub mod model;
pub mod server;
pub mod vision;
