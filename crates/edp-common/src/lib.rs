//! EDP Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the EDP project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all EDP workspace members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: Structured logging configuration built on `tracing`
//!
//! # Example
//!
//! ```no_run
//! use edp_common::{Result, EdpError};
//!
//! fn parse_release_id(raw: &str) -> Result<i64> {
//!     raw.trim()
//!         .parse()
//!         .map_err(|_| EdpError::Parse(format!("invalid release id: {raw}")))
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{EdpError, Result};
