//! Common types and utilities shared across the crate.
//!
//! - Configuration constants and [`IndexConfig`]
//! - Error types

pub mod config;
pub mod error;

pub use config::IndexConfig;
pub use error::{Error, Result};
