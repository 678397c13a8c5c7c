//! Core types, configuration, and error handling for yamler.
//!
//! This crate provides the shared foundation used by all other yamler crates:
//! - [`YamlerError`]: unified error type using `thiserror`
//! - [`YamlerConfig`]: configuration loaded from `.yamler.toml`
//! - Shared types: [`Entry`], [`ContextLine`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{
    DisplayConfig, FetchConfig, SearchConfig, YamlerConfig, DEFAULT_CONTEXT_LINES,
};
pub use error::YamlerError;
pub use types::{preview_value, ContextLine, Entry, OutputFormat};

/// Re-exported so downstream crates and tests can build entry values.
pub use serde_yaml::Value;

/// A convenience `Result` type for yamler operations.
pub type Result<T> = std::result::Result<T, YamlerError>;
