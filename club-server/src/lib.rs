//! Club Server - night club floor and payroll backend
//!
//! # Overview
//!
//! - **Floor** (`api::tables`, `api::sessions`): table layout and guest sessions
//! - **Casts** (`api::casts`, [`rotation`]): cast assignments with timed rotation
//! - **Billing** ([`billing`]): service charge, tax and slip rounding
//! - **Payroll** ([`payroll`]): hourly pay, backs and deductions
//! - **Auth** (`auth`): JWT + Argon2 with store roles
//!
//! # Layout
//!
//! ```text
//! club-server/src/
//! ├── core/          # config, state, server, background tasks
//! ├── auth/          # JWT, password hashing, permissions
//! ├── api/           # HTTP handlers, one module per resource
//! ├── routes/        # router assembly and middleware
//! ├── db/            # SQLite pool and repositories
//! ├── billing.rs     # session bill
//! ├── payroll/       # salary calculation
//! ├── rotation.rs    # cast rotation scheduler
//! └── utils/         # logging, validation, time helpers
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod payroll;
pub mod rotation;
pub mod routes;
pub mod utils;

// Re-exports
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - accepts tracing field values
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env` and start logging
///
/// Must run before [`Config::from_env`] so `.env` values are visible.
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}
