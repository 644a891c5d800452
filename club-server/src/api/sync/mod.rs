//! Resource version polling
//!
//! Every mutation bumps its resource counter; clients poll this endpoint
//! and re-fetch only what moved.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/sync/versions", get(handler::get_versions))
}
