//! Cast Assignment Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{
    CastAssignment, CastAssignmentCreate, CastAssignmentUpdate, CastPosition, GuestEntryCreate,
    RotationResult,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{cast_assignment, settings, table_session};
use crate::utils::time::parse_day_switch;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "cast_assignment";

fn validate_times(start: Option<i64>, end: Option<i64>) -> AppResult<()> {
    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        return Err(AppError::validation("end_time must not be before start_time"));
    }
    Ok(())
}

/// GET /api/sessions/{id}/casts - sorted by start time with the day switch applied
pub async fn list_by_session(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
) -> AppResult<Json<Vec<CastAssignment>>> {
    if table_session::find_by_id(&state.pool, current_user.store_id, session_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found(format!("Session {session_id}")));
    }
    let store_settings = settings::get_settings(&state.pool, current_user.store_id).await?;

    let mut assignments =
        cast_assignment::find_by_session(&state.pool, current_user.store_id, session_id).await?;
    shared::time_utils::sort_casts_by_time(
        &mut assignments,
        parse_day_switch(&store_settings.day_switch_time),
        state.config.timezone,
    );
    Ok(Json(assignments))
}

/// POST /api/sessions/{id}/casts
pub async fn add_cast(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
    Json(payload): Json<CastAssignmentCreate>,
) -> AppResult<Json<CastAssignment>> {
    validate_times(payload.start_time, payload.end_time)?;
    let assignment =
        cast_assignment::create(&state.pool, current_user.store_id, session_id, payload).await?;

    tracing::info!(
        user_id = current_user.id,
        session_id,
        assignment_id = assignment.id,
        cast_id = assignment.cast_id,
        status = ?assignment.status,
        "Cast assigned"
    );
    state.notify_change(RESOURCE);
    Ok(Json(assignment))
}

/// POST /api/sessions/{id}/guests
pub async fn add_guest(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
    Json(payload): Json<GuestEntryCreate>,
) -> AppResult<Json<CastAssignment>> {
    let entry =
        cast_assignment::create_guest_entry(&state.pool, current_user.store_id, session_id, payload)
            .await?;

    tracing::info!(
        user_id = current_user.id,
        session_id,
        guest_id = entry.cast_id,
        "Guest seated"
    );
    state.notify_change(RESOURCE);
    Ok(Json(entry))
}

/// PUT /api/casts/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CastAssignmentUpdate>,
) -> AppResult<Json<CastAssignment>> {
    validate_times(payload.start_time, payload.end_time)?;
    let assignment = cast_assignment::update(&state.pool, current_user.store_id, id, payload).await?;

    tracing::info!(user_id = current_user.id, assignment_id = id, status = ?assignment.status, "Assignment updated");
    state.notify_change(RESOURCE);
    Ok(Json(assignment))
}

/// PUT /api/casts/{id}/position
pub async fn move_position(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CastPosition>,
) -> AppResult<Json<CastAssignment>> {
    if payload.grid_x < 0 || payload.grid_y < 0 {
        return Err(AppError::validation("grid position must not be negative"));
    }
    let assignment =
        cast_assignment::move_position(&state.pool, current_user.store_id, id, payload).await?;
    state.notify_change(RESOURCE);
    Ok(Json(assignment))
}

/// POST /api/casts/{id}/end
pub async fn end(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<CastAssignment>> {
    let assignment = cast_assignment::end(&state.pool, current_user.store_id, id).await?;
    tracing::info!(user_id = current_user.id, assignment_id = id, "Assignment ended");
    state.notify_change(RESOURCE);
    Ok(Json(assignment))
}

/// DELETE /api/casts/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = cast_assignment::delete(&state.pool, current_user.store_id, id).await?;
    tracing::info!(user_id = current_user.id, assignment_id = id, "Assignment deleted");
    state.notify_change(RESOURCE);
    Ok(Json(result))
}

/// POST /api/casts/{id}/rotate
///
/// Same conditional rotation the scheduler runs; before the slot ends it
/// reports `rotated: false`.
pub async fn rotate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<RotationResult>> {
    let result = cast_assignment::rotate(
        &state.pool,
        current_user.store_id,
        id,
        shared::util::now_millis(),
    )
    .await?;

    if result.rotated {
        tracing::info!(
            user_id = current_user.id,
            assignment_id = id,
            promoted = ?result.promoted.as_ref().map(|p| p.id),
            "Cast rotated"
        );
        state.notify_change(RESOURCE);
    }
    Ok(Json(result))
}
