//! Store Model (店舗) and store-scoped settings rows

use serde::{Deserialize, Serialize};

/// Rounding direction shared by time rounding, slip rounding and back rounding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum RoundingMethod {
    /// Half-up to the nearest unit
    #[default]
    Round,
    /// Ceiling to the next unit
    Up,
    /// Floor to the previous unit
    Down,
}

/// Store entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
}

/// Update store payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreUpdate {
    pub name: Option<String>,
}

/// Store settings (one row per store)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StoreSettings {
    pub store_id: i64,
    /// 日付切替時刻 (HH:MM). Times before this belong to the previous business day.
    pub day_switch_time: String,
    pub time_rounding_enabled: bool,
    pub time_rounding_method: RoundingMethod,
    /// Rounding granularity for attendance times, in minutes
    pub time_rounding_minutes: i32,
    pub slip_rounding_enabled: bool,
    pub slip_rounding_method: RoundingMethod,
    /// Rounding unit for bills (1, 10, 100, 1000, 10000)
    pub slip_rounding_unit: i64,
    /// Service charge in percent (e.g. 20.0)
    pub service_rate: f64,
    /// Consumption tax in percent (e.g. 10.0)
    pub tax_rate: f64,
    /// Length of a serving slot started by rotation, in minutes (0 = open-ended)
    pub rotation_minutes: i32,
    pub tablet_timecard_enabled: bool,
    pub updated_at: i64,
}

/// Partial update of store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettingsUpdate {
    pub day_switch_time: Option<String>,
    pub time_rounding_enabled: Option<bool>,
    pub time_rounding_method: Option<RoundingMethod>,
    pub time_rounding_minutes: Option<i32>,
    pub slip_rounding_enabled: Option<bool>,
    pub slip_rounding_method: Option<RoundingMethod>,
    pub slip_rounding_unit: Option<i64>,
    pub service_rate: Option<f64>,
    pub tax_rate: Option<f64>,
    pub rotation_minutes: Option<i32>,
    pub tablet_timecard_enabled: Option<bool>,
}

/// Shift automation settings (one row per store)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShiftAutomationSettings {
    pub store_id: i64,
    pub enabled: bool,
    /// Time at which open attendance is clocked out automatically (HH:MM)
    pub auto_clock_out_time: String,
    pub notify_minutes_before: i32,
    pub updated_at: i64,
}

/// Partial update of shift automation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftAutomationUpdate {
    pub enabled: Option<bool>,
    pub auto_clock_out_time: Option<String>,
    pub notify_minutes_before: Option<i32>,
}
