//! Menu Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{Menu, MenuCreate, MenuUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::menu;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_non_negative, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "menu";

/// GET /api/menus - active items in display order
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Menu>>> {
    let menus = menu::find_all(&state.pool, current_user.store_id).await?;
    Ok(Json(menus))
}

/// GET /api/menus/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Menu>> {
    let item = menu::find_by_id(&state.pool, current_user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu {id}")))?;
    Ok(Json(item))
}

/// POST /api/menus
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<MenuCreate>,
) -> AppResult<Json<Menu>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.category, "category", MAX_NAME_LEN)?;
    validate_non_negative(payload.price, "price")?;

    let item = menu::create(&state.pool, current_user.store_id, payload).await?;
    tracing::info!(user_id = current_user.id, menu_id = item.id, name = %item.name, price = item.price, "Menu created");
    state.notify_change(RESOURCE);
    Ok(Json(item))
}

/// PUT /api/menus/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuUpdate>,
) -> AppResult<Json<Menu>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.category, "category", MAX_NAME_LEN)?;
    if let Some(price) = payload.price {
        validate_non_negative(price, "price")?;
    }

    let item = menu::update(&state.pool, current_user.store_id, id, payload).await?;
    tracing::info!(user_id = current_user.id, menu_id = id, "Menu updated");
    state.notify_change(RESOURCE);
    Ok(Json(item))
}

/// DELETE /api/menus/{id}
///
/// Soft delete; orders keep their snapshot of name and price.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = menu::delete(&state.pool, current_user.store_id, id).await?;
    tracing::info!(user_id = current_user.id, menu_id = id, "Menu deleted");
    state.notify_change(RESOURCE);
    Ok(Json(result))
}
