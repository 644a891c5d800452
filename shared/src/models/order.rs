//! Order and Menu Models

use serde::{Deserialize, Serialize};

/// Menu item (メニュー)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Menu {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub category: Option<String>,
    /// Price in yen
    pub price: i64,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCreate {
    pub name: String,
    pub category: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub sort_order: i32,
}

/// Update menu payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Order line attached to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub store_id: i64,
    pub table_session_id: i64,
    pub menu_id: Option<i64>,
    /// Name snapshot at order time
    pub item_name: String,
    pub quantity: i32,
    /// Price snapshot at order time
    pub unit_price: i64,
    pub amount: i64,
    /// Cast credited with the order (drink backs)
    pub cast_id: Option<i64>,
    pub guest_id: Option<i64>,
    pub created_at: i64,
}

/// Create order payload
///
/// With `menu_id` the name and price come from the menu; free-text items
/// must carry both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub menu_id: Option<i64>,
    pub item_name: Option<String>,
    pub unit_price: Option<i64>,
    pub quantity: i32,
    pub cast_id: Option<i64>,
    pub guest_id: Option<i64>,
}

/// Update order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub quantity: i32,
}
