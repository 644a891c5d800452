//! Table Session Model (来店セッション)

use serde::{Deserialize, Serialize};

use super::{CastAssignment, Order};

/// Session status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SessionStatus {
    #[default]
    Active,
    Closed,
}

/// A party seated at a table, from opening to checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableSession {
    pub id: i64,
    pub store_id: i64,
    pub table_id: i64,
    pub guest_count: i32,
    pub status: SessionStatus,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub note: Option<String>,
    /// Sum of order amounts (set at close)
    pub subtotal: i64,
    /// Billed total after service, tax and slip rounding (set at close)
    pub total: i64,
    pub updated_at: i64,
}

/// Open session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSessionCreate {
    pub table_id: i64,
    pub guest_count: i32,
    pub note: Option<String>,
}

/// Update session payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSessionUpdate {
    pub guest_count: Option<i32>,
    pub note: Option<String>,
}

/// Move session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSessionMove {
    pub table_id: i64,
}

/// Computed bill for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub subtotal: i64,
    pub service_charge: i64,
    pub tax: i64,
    pub total: i64,
}

/// Session with everything the floor screen shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session: TableSession,
    /// Sorted by start time with the store's day switch applied
    pub assignments: Vec<CastAssignment>,
    pub orders: Vec<Order>,
    pub bill: Bill,
}
