//! Store and Settings Handlers

use axum::{Extension, Json, extract::State};
use shared::error::ErrorCode;
use shared::models::{
    ShiftAutomationSettings, ShiftAutomationUpdate, Store, StoreSettings, StoreSettingsUpdate,
    StoreUpdate,
};
use shared::time_utils::parse_time;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{settings, store};
use crate::utils::validation::{
    MAX_NAME_LEN, validate_percentage, validate_required_text, validate_rounding_unit,
};
use crate::utils::{AppError, AppResult};

const RESOURCE_STORE: &str = "store";
const RESOURCE_SETTINGS: &str = "store_settings";

fn validate_time(value: &str, field: &str) -> AppResult<()> {
    if parse_time(value).is_none() {
        return Err(AppError::with_message(
            ErrorCode::InvalidTimeFormat,
            format!("{field} must be HH:MM, got '{value}'"),
        ));
    }
    Ok(())
}

/// GET /api/store
pub async fn get_store(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Store>> {
    let store = store::find_by_id(&state.pool, current_user.store_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
    Ok(Json(store))
}

/// PUT /api/store
pub async fn update_store(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<StoreUpdate>,
) -> AppResult<Json<Store>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    let store = store::update(&state.pool, current_user.store_id, payload).await?;

    tracing::info!(user_id = current_user.id, store_id = store.id, "Store updated");
    state.notify_change(RESOURCE_STORE);
    Ok(Json(store))
}

/// GET /api/settings
pub async fn get_settings(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<StoreSettings>> {
    let settings = settings::get_settings(&state.pool, current_user.store_id).await?;
    Ok(Json(settings))
}

fn validate_settings(payload: &StoreSettingsUpdate) -> AppResult<()> {
    if let Some(time) = &payload.day_switch_time {
        validate_time(time, "day_switch_time")?;
    }
    if let Some(minutes) = payload.time_rounding_minutes
        && !(1..=60).contains(&minutes)
    {
        return Err(AppError::validation(format!(
            "time_rounding_minutes must be between 1 and 60, got {minutes}"
        )));
    }
    if let Some(unit) = payload.slip_rounding_unit {
        validate_rounding_unit(unit, "slip_rounding_unit")?;
    }
    if let Some(rate) = payload.service_rate {
        validate_percentage(rate, "service_rate")?;
    }
    if let Some(rate) = payload.tax_rate {
        validate_percentage(rate, "tax_rate")?;
    }
    if let Some(minutes) = payload.rotation_minutes
        && !(0..=24 * 60).contains(&minutes)
    {
        return Err(AppError::validation(format!(
            "rotation_minutes must be between 0 and 1440, got {minutes}"
        )));
    }
    Ok(())
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<StoreSettingsUpdate>,
) -> AppResult<Json<StoreSettings>> {
    validate_settings(&payload)?;
    let settings = settings::update_settings(&state.pool, current_user.store_id, payload).await?;

    tracing::info!(
        user_id = current_user.id,
        store_id = current_user.store_id,
        day_switch = %settings.day_switch_time,
        "Store settings updated"
    );
    state.notify_change(RESOURCE_SETTINGS);
    Ok(Json(settings))
}

/// GET /api/settings/shift-automation
pub async fn get_shift_automation(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ShiftAutomationSettings>> {
    let settings = settings::get_shift_automation(&state.pool, current_user.store_id).await?;
    Ok(Json(settings))
}

/// PUT /api/settings/shift-automation
pub async fn update_shift_automation(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ShiftAutomationUpdate>,
) -> AppResult<Json<ShiftAutomationSettings>> {
    if let Some(time) = &payload.auto_clock_out_time {
        validate_time(time, "auto_clock_out_time")?;
    }
    if let Some(minutes) = payload.notify_minutes_before
        && minutes < 0
    {
        return Err(AppError::validation("notify_minutes_before cannot be negative"));
    }

    let settings =
        settings::update_shift_automation(&state.pool, current_user.store_id, payload).await?;
    tracing::info!(
        user_id = current_user.id,
        store_id = current_user.store_id,
        enabled = settings.enabled,
        "Shift automation updated"
    );
    state.notify_change(RESOURCE_SETTINGS);
    Ok(Json(settings))
}
