//! Image upload relay
//!
//! Accepts a single image over HTTP, stages it on local disk, forwards it to a
//! media host and records the public URL it is served from.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]
#![allow(clippy::module_name_repetitions)]

/// Media host integration
pub mod media_host;

/// HTTP routes
pub mod routes;

/// Server startup
pub mod server;

/// Local staging of uploads
pub mod staging;

/// Application state
pub mod state;

/// Configuration and error types
pub mod types;

/// In-memory stand-ins for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
