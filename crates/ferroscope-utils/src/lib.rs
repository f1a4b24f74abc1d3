//! # Ferroscope Utilities
//!
//! Shared utilities, logging and configuration for Ferroscope.
//!
//! This crate provides common functionality used across the Ferroscope
//! workspace: `tracing` setup that keeps stdout free for payloads, and
//! environment overrides for the traversal limits.

pub mod config;
pub mod logging;

pub use config::{ConfigError, LimitOverrides};
// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
