//! API routes
//!
//! One module per resource, each exposing `router()`:
//!
//! - [`health`] - liveness and database probe
//! - [`auth`] - login and current user
//! - [`store`] - store info and settings
//! - [`tables`] - floor layout
//! - [`sessions`] - table sessions and billing
//! - [`casts`] - cast assignments and rotation
//! - [`orders`] / [`menus`] - drinks and food
//! - [`profiles`] - casts, staff and guests
//! - [`roles`] - store roles and permissions
//! - [`salary_systems`] / [`payroll`] - pay rules and calculation
//! - [`sync`] - resource version polling

pub mod auth;
pub mod casts;
pub mod health;
pub mod menus;
pub mod orders;
pub mod payroll;
pub mod profiles;
pub mod roles;
pub mod salary_systems;
pub mod sessions;
pub mod store;
pub mod sync;
pub mod tables;
