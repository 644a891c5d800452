//! Cast Assignment API (付け回し)
//!
//! Assignments are created under their session and addressed by id
//! afterwards.

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes =
        Router::new().route("/api/sessions/{id}/casts", get(handler::list_by_session));

    let manage_routes = Router::new()
        .route("/api/sessions/{id}/casts", post(handler::add_cast))
        .route("/api/sessions/{id}/guests", post(handler::add_guest))
        .route("/api/casts/{id}", put(handler::update).delete(handler::delete))
        .route("/api/casts/{id}/position", put(handler::move_position))
        .route("/api/casts/{id}/end", post(handler::end))
        .route("/api/casts/{id}/rotate", post(handler::rotate))
        .layer(middleware::from_fn(require_permission("casts:manage")));

    read_routes.merge(manage_routes)
}
