//! Profile API (casts, staff, guests)

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/profiles", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/salary-systems", get(handler::get_salary_systems));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/salary-systems", put(handler::set_salary_systems))
        .layer(middleware::from_fn(require_permission("profiles:manage")));

    read_routes.merge(manage_routes)
}
