//! Table API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{Table, TableCreate, TableLayoutItem, TableUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::table;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "table";

fn validate_geometry(width: Option<i32>, height: Option<i32>, capacity: Option<i32>) -> AppResult<()> {
    if width.is_some_and(|w| w <= 0) || height.is_some_and(|h| h <= 0) {
        return Err(AppError::validation("width and height must be positive"));
    }
    if capacity.is_some_and(|c| c < 1) {
        return Err(AppError::validation("capacity must be at least 1"));
    }
    Ok(())
}

/// GET /api/tables
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Table>>> {
    let tables = table::find_all(&state.pool, current_user.store_id).await?;
    Ok(Json(tables))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Table>> {
    let table = table::find_by_id(&state.pool, current_user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {id}")))?;
    Ok(Json(table))
}

/// POST /api/tables
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<TableCreate>,
) -> AppResult<Json<Table>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_geometry(payload.width, payload.height, payload.capacity)?;

    let table = table::create(&state.pool, current_user.store_id, payload).await?;
    tracing::info!(user_id = current_user.id, table_id = table.id, name = %table.name, "Table created");
    state.notify_change(RESOURCE);
    Ok(Json(table))
}

/// PUT /api/tables/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<TableUpdate>,
) -> AppResult<Json<Table>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_geometry(payload.width, payload.height, payload.capacity)?;

    let table = table::update(&state.pool, current_user.store_id, id, payload).await?;
    tracing::info!(user_id = current_user.id, table_id = id, "Table updated");
    state.notify_change(RESOURCE);
    Ok(Json(table))
}

/// DELETE /api/tables/{id} (soft delete)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = table::delete(&state.pool, current_user.store_id, id).await?;
    tracing::info!(user_id = current_user.id, table_id = id, "Table deleted");
    state.notify_change(RESOURCE);
    Ok(Json(result))
}

/// PUT /api/tables/layout - bulk save from the layout editor
pub async fn update_layout(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(items): Json<Vec<TableLayoutItem>>,
) -> AppResult<Json<Vec<Table>>> {
    for item in &items {
        validate_geometry(item.width, item.height, None)?;
    }
    let tables = table::update_layout(&state.pool, current_user.store_id, &items).await?;
    tracing::info!(user_id = current_user.id, count = items.len(), "Table layout saved");
    state.notify_change(RESOURCE);
    Ok(Json(tables))
}
