//! Payroll API
//!
//! Calculates a profile's pay for a period with the salary system assigned
//! to its target.

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::require_permission;
use crate::core::ServerState;

pub(crate) use handler::run_calculation;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/payroll/calculate", post(handler::calculate))
        .layer(middleware::from_fn(require_permission("payroll:view")))
}
