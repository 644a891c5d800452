//! Salary System Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::ErrorCode;
use shared::models::{
    DeductionOrder, PayrollBreakdown, PayrollInput, SalarySystem, SalarySystemInput,
};

use crate::api::payroll::run_calculation;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::salary_system;
use crate::payroll;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "salary_system";

async fn require_system(state: &ServerState, store_id: i64, id: i64) -> AppResult<SalarySystem> {
    salary_system::find_by_id(&state.pool, store_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::SalarySystemNotFound,
                format!("Salary system {id} not found"),
            )
        })
}

/// GET /api/salary-systems
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<SalarySystem>>> {
    let systems = salary_system::find_all(&state.pool, current_user.store_id).await?;
    Ok(Json(systems))
}

/// GET /api/salary-systems/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<SalarySystem>> {
    let system = require_system(&state, current_user.store_id, id).await?;
    Ok(Json(system))
}

/// POST /api/salary-systems
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<SalarySystemInput>,
) -> AppResult<Json<SalarySystem>> {
    let input = payroll::normalize_system(payload)?;
    let system = salary_system::create(&state.pool, current_user.store_id, input).await?;

    tracing::info!(
        user_id = current_user.id,
        salary_system_id = system.id,
        name = %system.name,
        target = ?system.target,
        "Salary system created"
    );
    state.notify_change(RESOURCE);
    Ok(Json(system))
}

/// PUT /api/salary-systems/{id} - full replace
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<SalarySystemInput>,
) -> AppResult<Json<SalarySystem>> {
    let input = payroll::normalize_system(payload)?;
    let system = salary_system::update(&state.pool, current_user.store_id, id, input).await?;

    tracing::info!(user_id = current_user.id, salary_system_id = id, "Salary system updated");
    state.notify_change(RESOURCE);
    Ok(Json(system))
}

/// DELETE /api/salary-systems/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = salary_system::delete(&state.pool, current_user.store_id, id).await?;
    tracing::info!(user_id = current_user.id, salary_system_id = id, "Salary system deleted");
    state.notify_change(RESOURCE);
    Ok(Json(result))
}

/// PUT /api/salary-systems/{id}/deductions/order
pub async fn reorder_deductions(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<DeductionOrder>,
) -> AppResult<Json<SalarySystem>> {
    let system = salary_system::reorder_deductions(
        &state.pool,
        current_user.store_id,
        id,
        &payload.deduction_ids,
    )
    .await?;
    state.notify_change(RESOURCE);
    Ok(Json(system))
}

/// POST /api/salary-systems/{id}/simulate
///
/// Runs the calculator against hypothetical attendance and back events
/// without touching any profile.
pub async fn simulate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PayrollInput>,
) -> AppResult<Json<PayrollBreakdown>> {
    let system = require_system(&state, current_user.store_id, id).await?;
    let breakdown = run_calculation(&state, current_user.store_id, &system, &payload).await?;
    Ok(Json(breakdown))
}
