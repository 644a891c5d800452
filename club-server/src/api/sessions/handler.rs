//! Table Session Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{
    SessionDetail, TableSession, TableSessionCreate, TableSessionMove, TableSessionUpdate,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::table_session;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "table_session";

fn validate_guest_count(count: i32) -> AppResult<()> {
    if count < 1 {
        return Err(AppError::validation(format!(
            "guest_count must be at least 1, got {count}"
        )));
    }
    Ok(())
}

/// GET /api/sessions - active sessions
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<TableSession>>> {
    let sessions = table_session::find_active(&state.pool, current_user.store_id).await?;
    Ok(Json(sessions))
}

/// GET /api/sessions/{id} - session, sorted assignments, orders and bill
pub async fn get_detail(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<SessionDetail>> {
    let detail =
        table_session::detail(&state.pool, current_user.store_id, id, state.config.timezone)
            .await?;
    Ok(Json(detail))
}

/// POST /api/sessions
pub async fn open(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<TableSessionCreate>,
) -> AppResult<Json<TableSession>> {
    validate_guest_count(payload.guest_count)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let session = table_session::open(&state.pool, current_user.store_id, payload).await?;
    tracing::info!(
        user_id = current_user.id,
        session_id = session.id,
        table_id = session.table_id,
        guests = session.guest_count,
        "Session opened"
    );
    state.notify_change(RESOURCE);
    Ok(Json(session))
}

/// PUT /api/sessions/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<TableSessionUpdate>,
) -> AppResult<Json<TableSession>> {
    if let Some(count) = payload.guest_count {
        validate_guest_count(count)?;
    }
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let session = table_session::update(&state.pool, current_user.store_id, id, payload).await?;
    tracing::info!(user_id = current_user.id, session_id = id, "Session updated");
    state.notify_change(RESOURCE);
    Ok(Json(session))
}

/// POST /api/sessions/{id}/move
pub async fn move_table(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<TableSessionMove>,
) -> AppResult<Json<TableSession>> {
    let session =
        table_session::move_to(&state.pool, current_user.store_id, id, payload.table_id).await?;
    tracing::info!(
        user_id = current_user.id,
        session_id = id,
        table_id = payload.table_id,
        "Session moved"
    );
    state.notify_change(RESOURCE);
    Ok(Json(session))
}

/// POST /api/sessions/{id}/close
pub async fn close(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<TableSession>> {
    let session = table_session::close(&state.pool, current_user.store_id, id).await?;
    tracing::info!(
        user_id = current_user.id,
        session_id = id,
        subtotal = session.subtotal,
        total = session.total,
        "Session closed"
    );
    state.notify_change(RESOURCE);
    state.notify_change("cast_assignment");
    Ok(Json(session))
}
