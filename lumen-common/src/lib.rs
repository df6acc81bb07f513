//! # Lumen Common Library
//!
//! Shared code for the Lumen client crates including:
//! - Error types
//! - Configuration loading (TOML + environment)
//! - Logging initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
