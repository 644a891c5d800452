//! Order Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{Order, OrderCreate, OrderUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{order, table_session};
use crate::utils::validation::{MAX_NAME_LEN, validate_non_negative, validate_optional_text};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "order";

/// GET /api/sessions/{id}/orders
pub async fn list_by_session(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
) -> AppResult<Json<Vec<Order>>> {
    if table_session::find_by_id(&state.pool, current_user.store_id, session_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found(format!("Session {session_id}")));
    }
    let orders = order::find_by_session(&state.pool, current_user.store_id, session_id).await?;
    Ok(Json(orders))
}

/// POST /api/sessions/{id}/orders
///
/// Either `menu_id` (name and price snapshotted from the menu) or a free
/// text `item_name` with `unit_price`.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    validate_optional_text(&payload.item_name, "item_name", MAX_NAME_LEN)?;
    if let Some(price) = payload.unit_price {
        validate_non_negative(price, "unit_price")?;
    }

    let created = order::create(&state.pool, current_user.store_id, session_id, payload).await?;
    tracing::info!(
        user_id = current_user.id,
        session_id,
        order_id = created.id,
        item = %created.item_name,
        amount = created.amount,
        "Order added"
    );
    state.notify_change(RESOURCE);
    Ok(Json(created))
}

/// PUT /api/orders/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<Order>> {
    let updated =
        order::update_quantity(&state.pool, current_user.store_id, id, payload.quantity).await?;
    tracing::info!(user_id = current_user.id, order_id = id, quantity = updated.quantity, "Order updated");
    state.notify_change(RESOURCE);
    Ok(Json(updated))
}

/// DELETE /api/orders/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = order::delete(&state.pool, current_user.store_id, id).await?;
    tracing::info!(user_id = current_user.id, order_id = id, "Order deleted");
    state.notify_change(RESOURCE);
    Ok(Json(result))
}
