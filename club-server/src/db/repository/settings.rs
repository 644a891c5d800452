//! Store Settings Repository
//!
//! `store_settings` and `shift_automation_settings` hold one row per store.
//! Rows are created with column defaults the first time they are read.

use super::RepoResult;
use shared::models::{
    ShiftAutomationSettings, ShiftAutomationUpdate, StoreSettings, StoreSettingsUpdate,
};
use sqlx::SqlitePool;

const SETTINGS_COLUMNS: &str = "store_id, day_switch_time, time_rounding_enabled, time_rounding_method, time_rounding_minutes, slip_rounding_enabled, slip_rounding_method, slip_rounding_unit, service_rate, tax_rate, rotation_minutes, tablet_timecard_enabled, updated_at";

/// Read the store's settings, creating the default row on demand
pub async fn get_settings(pool: &SqlitePool, store_id: i64) -> RepoResult<StoreSettings> {
    sqlx::query("INSERT OR IGNORE INTO store_settings (store_id, updated_at) VALUES (?, ?)")
        .bind(store_id)
        .bind(shared::util::now_millis())
        .execute(pool)
        .await?;

    let settings = sqlx::query_as::<_, StoreSettings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM store_settings WHERE store_id = ?"
    ))
    .bind(store_id)
    .fetch_one(pool)
    .await?;
    Ok(settings)
}

/// Partial update; `None` fields keep their value
pub async fn update_settings(
    pool: &SqlitePool,
    store_id: i64,
    data: StoreSettingsUpdate,
) -> RepoResult<StoreSettings> {
    // make sure the row exists before updating it
    get_settings(pool, store_id).await?;

    sqlx::query(
        "UPDATE store_settings SET \
            day_switch_time = COALESCE(?1, day_switch_time), \
            time_rounding_enabled = COALESCE(?2, time_rounding_enabled), \
            time_rounding_method = COALESCE(?3, time_rounding_method), \
            time_rounding_minutes = COALESCE(?4, time_rounding_minutes), \
            slip_rounding_enabled = COALESCE(?5, slip_rounding_enabled), \
            slip_rounding_method = COALESCE(?6, slip_rounding_method), \
            slip_rounding_unit = COALESCE(?7, slip_rounding_unit), \
            service_rate = COALESCE(?8, service_rate), \
            tax_rate = COALESCE(?9, tax_rate), \
            rotation_minutes = COALESCE(?10, rotation_minutes), \
            tablet_timecard_enabled = COALESCE(?11, tablet_timecard_enabled), \
            updated_at = ?12 \
         WHERE store_id = ?13",
    )
    .bind(data.day_switch_time)
    .bind(data.time_rounding_enabled)
    .bind(data.time_rounding_method)
    .bind(data.time_rounding_minutes)
    .bind(data.slip_rounding_enabled)
    .bind(data.slip_rounding_method)
    .bind(data.slip_rounding_unit)
    .bind(data.service_rate)
    .bind(data.tax_rate)
    .bind(data.rotation_minutes)
    .bind(data.tablet_timecard_enabled)
    .bind(shared::util::now_millis())
    .bind(store_id)
    .execute(pool)
    .await?;

    get_settings(pool, store_id).await
}

pub async fn get_shift_automation(
    pool: &SqlitePool,
    store_id: i64,
) -> RepoResult<ShiftAutomationSettings> {
    sqlx::query(
        "INSERT OR IGNORE INTO shift_automation_settings (store_id, updated_at) VALUES (?, ?)",
    )
    .bind(store_id)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;

    let settings = sqlx::query_as::<_, ShiftAutomationSettings>(
        "SELECT store_id, enabled, auto_clock_out_time, notify_minutes_before, updated_at FROM shift_automation_settings WHERE store_id = ?",
    )
    .bind(store_id)
    .fetch_one(pool)
    .await?;
    Ok(settings)
}

pub async fn update_shift_automation(
    pool: &SqlitePool,
    store_id: i64,
    data: ShiftAutomationUpdate,
) -> RepoResult<ShiftAutomationSettings> {
    get_shift_automation(pool, store_id).await?;

    sqlx::query(
        "UPDATE shift_automation_settings SET enabled = COALESCE(?1, enabled), auto_clock_out_time = COALESCE(?2, auto_clock_out_time), notify_minutes_before = COALESCE(?3, notify_minutes_before), updated_at = ?4 WHERE store_id = ?5",
    )
    .bind(data.enabled)
    .bind(data.auto_clock_out_time)
    .bind(data.notify_minutes_before)
    .bind(shared::util::now_millis())
    .bind(store_id)
    .execute(pool)
    .await?;

    get_shift_automation(pool, store_id).await
}
