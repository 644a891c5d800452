//! Shared types for the club venue backend
//!
//! Models, the unified error system, day-switch time utilities and the
//! auth DTOs used by both the server and its clients.

pub mod client;
pub mod error;
pub mod models;
pub mod time_utils;
pub mod util;

// Re-exports
pub use axum::Json;
pub use serde::{Deserialize, Serialize};
