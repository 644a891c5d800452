//! Table Model (フロアのテーブル)

use serde::{Deserialize, Serialize};

/// Shape drawn by the floor layout editor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TableShape {
    #[default]
    Rect,
    Circle,
}

/// Table entity with its floor position
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Table {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub shape: TableShape,
    pub capacity: i32,
    pub is_active: bool,
}

/// Create table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCreate {
    pub name: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub shape: Option<TableShape>,
    pub capacity: Option<i32>,
}

/// Update table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableUpdate {
    pub name: Option<String>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub shape: Option<TableShape>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

/// One entry of a bulk layout save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableLayoutItem {
    pub id: i64,
    pub x: i32,
    pub y: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
}
