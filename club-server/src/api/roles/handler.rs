//! Store Role Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::ErrorCode;
use shared::models::{StoreRole, StoreRoleCreate, StoreRoleUpdate};

use crate::auth::CurrentUser;
use crate::auth::permissions::{ALL_PERMISSIONS, validate_permission_ceiling};
use crate::core::ServerState;
use crate::db::repository::store_role;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "store_role";

/// GET /api/roles
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<StoreRole>>> {
    let roles = store_role::find_all(&state.pool, current_user.store_id).await?;
    Ok(Json(roles))
}

async fn require_role(state: &ServerState, store_id: i64, id: i64) -> AppResult<StoreRole> {
    store_role::find_by_id(&state.pool, store_id, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::RoleNotFound, format!("Role {id} not found")))
}

/// GET /api/roles/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<StoreRole>> {
    let role = require_role(&state, current_user.store_id, id).await?;
    Ok(Json(role))
}

/// POST /api/roles
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<StoreRoleCreate>,
) -> AppResult<Json<StoreRole>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_permission_ceiling(&current_user, &payload.permissions)?;

    let role = store_role::create(&state.pool, current_user.store_id, payload).await?;
    tracing::info!(
        user_id = current_user.id,
        username = %current_user.username,
        role_id = role.id,
        role_name = %role.name,
        "Role created"
    );
    state.notify_change(RESOURCE);
    Ok(Json(role))
}

/// PUT /api/roles/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<StoreRoleUpdate>,
) -> AppResult<Json<StoreRole>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(permissions) = &payload.permissions {
        validate_permission_ceiling(&current_user, permissions)?;
    }

    let role = store_role::update(&state.pool, current_user.store_id, id, payload).await?;
    tracing::info!(
        user_id = current_user.id,
        username = %current_user.username,
        role_id = id,
        "Role updated"
    );
    state.notify_change(RESOURCE);
    Ok(Json(role))
}

/// DELETE /api/roles/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = store_role::delete(&state.pool, current_user.store_id, id).await?;
    tracing::info!(
        user_id = current_user.id,
        username = %current_user.username,
        role_id = id,
        "Role deleted"
    );
    state.notify_change(RESOURCE);
    Ok(Json(result))
}

/// GET /api/permissions - grantable permissions
pub async fn get_all_permissions() -> Json<Vec<String>> {
    Json(ALL_PERMISSIONS.iter().map(|s| s.to_string()).collect())
}

/// GET /api/roles/{id}/permissions
pub async fn get_role_permissions(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<String>>> {
    let role = require_role(&state, current_user.store_id, id).await?;
    Ok(Json(role.permissions))
}
