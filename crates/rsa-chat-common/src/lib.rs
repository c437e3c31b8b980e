//! Shared utilities for rsa-chat: logging, error types, constant-time helpers.
//!
//! This crate provides common infrastructure used across all rsa-chat components.

#![forbid(unsafe_code)]

pub mod error;
pub mod helpers;

pub use error::{Error, Result};

/// Initialize tracing with a specific default level.
///
/// Log level is controlled by the `RUST_LOG` environment variable.
/// Falls back to `default_level` if not set.
pub fn init_tracing_with_default(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
