//! Cast Assignment Model (キャスト付け回し)

use serde::{Deserialize, Serialize};

/// Assignment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum CastStatus {
    /// Queued for the guest, not yet at the table
    #[default]
    Waiting,
    /// Currently at the table
    Serving,
    /// Finished; terminal
    Ended,
    /// In-house nomination (場内指名)
    Jonai,
    /// Named request (本指名)
    Shimei,
}

impl CastStatus {
    /// Whether the cast still occupies a slot in the session
    pub fn is_active(&self) -> bool {
        !matches!(self, CastStatus::Ended)
    }
}

/// Links a cast member (or a guest entry) to a session
///
/// Guest entries are self-referential: `cast_id == guest_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CastAssignment {
    pub id: i64,
    pub store_id: i64,
    pub table_session_id: i64,
    pub cast_id: i64,
    pub guest_id: Option<i64>,
    pub status: CastStatus,
    pub grid_x: i32,
    pub grid_y: i32,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CastAssignment {
    /// Guest rows share the grid with casts but point at themselves
    pub fn is_guest_entry(&self) -> bool {
        self.guest_id == Some(self.cast_id)
    }
}

/// Add cast payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastAssignmentCreate {
    pub cast_id: i64,
    pub guest_id: Option<i64>,
    pub status: Option<CastStatus>,
    #[serde(default)]
    pub grid_x: i32,
    #[serde(default)]
    pub grid_y: i32,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// Add guest entry payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestEntryCreate {
    pub guest_id: i64,
    #[serde(default)]
    pub grid_x: i32,
    #[serde(default)]
    pub grid_y: i32,
}

/// Update assignment payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastAssignmentUpdate {
    pub status: Option<CastStatus>,
    pub guest_id: Option<i64>,
    pub grid_x: Option<i32>,
    pub grid_y: Option<i32>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// Grid move payload (drag-and-drop)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastPosition {
    pub grid_x: i32,
    pub grid_y: i32,
}

/// Outcome of a rotation attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationResult {
    /// False when the assignment was no longer serving (already rotated)
    pub rotated: bool,
    pub ended: Option<CastAssignment>,
    pub promoted: Option<CastAssignment>,
}
