//! Store and Settings API
//!
//! Everyone in the store may read; writes need `settings:manage`.

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/store", get(handler::get_store))
        .route("/api/settings", get(handler::get_settings))
        .route("/api/settings/shift-automation", get(handler::get_shift_automation));

    let manage_routes = Router::new()
        .route("/api/store", axum::routing::put(handler::update_store))
        .route("/api/settings", axum::routing::put(handler::update_settings))
        .route(
            "/api/settings/shift-automation",
            axum::routing::put(handler::update_shift_automation),
        )
        .layer(middleware::from_fn(require_permission("settings:manage")));

    read_routes.merge(manage_routes)
}
