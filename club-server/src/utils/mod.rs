//! Utility module
//!
//! - [`AppError`] / [`AppResult`] - unified error types (from `shared::error`)
//! - [`logger`] - tracing setup
//! - [`validation`] - input length and range checks
//! - [`time`] - business timezone and day-switch helpers

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
