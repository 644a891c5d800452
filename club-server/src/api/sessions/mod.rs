//! Table Session API

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sessions", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_detail));

    let manage_routes = Router::new()
        .route("/", post(handler::open))
        .route("/{id}", put(handler::update))
        .route("/{id}/move", post(handler::move_table))
        .route("/{id}/close", post(handler::close))
        .layer(middleware::from_fn(require_permission("sessions:manage")));

    read_routes.merge(manage_routes)
}
