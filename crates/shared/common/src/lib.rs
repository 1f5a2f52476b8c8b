//! Common utilities shared across the workspace.
//!
//! This crate provides:
//! - Error kinds with their HTTP status and payload mapping
//! - Configuration structures
//! - Locale-aware datatypes

pub mod config;
pub mod datatype;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, ConstraintViolationInfo, ErrorInfo, ErrorPayload, OptionExt};
