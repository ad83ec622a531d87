//! Shared utilities for the faq-bootstrap components
//!
//! This crate provides the ambient plumbing used by the bootstrap function:
//! - Structured logging initialization
//! - Environment variable parsing helpers
//! - Accessors for the Lambda execution environment

pub mod config;
pub mod logging;

pub use config::{ConfigExt, LambdaEnv};
pub use logging::init_logging;
