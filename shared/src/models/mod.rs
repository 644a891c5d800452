//! Data models
//!
//! Shared between club-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis
//! and money is whole yen.

pub mod cast_assignment;
pub mod order;
pub mod payroll;
pub mod profile;
pub mod salary_system;
pub mod store;
pub mod store_role;
pub mod sync;
pub mod table;
pub mod table_session;

// Re-exports
pub use cast_assignment::*;
pub use order::*;
pub use payroll::*;
pub use profile::*;
pub use salary_system::*;
pub use store::*;
pub use store_role::*;
pub use sync::*;
pub use table::*;
pub use table_session::*;
