use thiserror::Error;

use crate::db::repository::RepoError;

/// Startup and run-loop failures
///
/// Request handlers use [`crate::AppError`]; this type covers what can go
/// wrong before or around the HTTP server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] RepoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
