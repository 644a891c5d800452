//! Order API
//!
//! Orders belong to a session; they are created under it and edited by id.

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes =
        Router::new().route("/api/sessions/{id}/orders", get(handler::list_by_session));

    let manage_routes = Router::new()
        .route("/api/sessions/{id}/orders", post(handler::create))
        .route("/api/orders/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_permission("orders:manage")));

    read_routes.merge(manage_routes)
}
