//! Sync API Handlers

use axum::{Json, extract::State};
use shared::models::SyncStatus;

use crate::core::ServerState;

/// GET /api/sync/versions
///
/// Server epoch plus the version of every resource touched since startup.
/// Clients call this on reconnect and on their poll interval.
pub async fn get_versions(State(state): State<ServerState>) -> Json<SyncStatus> {
    Json(state.sync_status())
}
