//! Authentication API
//!
//! - `POST /api/auth/login` is public
//! - `GET /api/auth/me` requires a token

mod handler;

use axum::{Router, routing::{get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/me", get(handler::me))
}
