//! Salary System API (給与体系)

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/salary-systems", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/deductions/order", put(handler::reorder_deductions))
        .layer(middleware::from_fn(require_permission("salary:manage")));

    let simulate_routes = Router::new()
        .route("/{id}/simulate", post(handler::simulate))
        .layer(middleware::from_fn(require_permission("payroll:view")));

    read_routes.merge(manage_routes).merge(simulate_routes)
}
