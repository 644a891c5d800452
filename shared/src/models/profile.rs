//! Profile Model (キャスト・スタッフ・ゲスト)

use serde::{Deserialize, Serialize};

use super::SalaryTarget;

/// Kind of person a profile describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ProfileRole {
    Cast,
    Staff,
    Guest,
    Admin,
}

impl ProfileRole {
    /// Salary target a profile of this kind is paid under, if any
    pub fn salary_target(&self) -> Option<SalaryTarget> {
        match self {
            ProfileRole::Cast => Some(SalaryTarget::Cast),
            ProfileRole::Staff | ProfileRole::Admin => Some(SalaryTarget::Staff),
            ProfileRole::Guest => None,
        }
    }
}

/// Profile entity (password hash never leaves the repository)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Profile {
    pub id: i64,
    pub store_id: i64,
    pub display_name: String,
    pub role: ProfileRole,
    pub store_role_id: Option<i64>,
    pub username: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create profile payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCreate {
    pub display_name: String,
    pub role: ProfileRole,
    pub store_role_id: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Update profile payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub role: Option<ProfileRole>,
    pub store_role_id: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

/// Profile ↔ salary system link (`profile_salary_systems`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProfileSalarySystem {
    pub profile_id: i64,
    pub salary_system_id: i64,
    pub target: SalaryTarget,
}

/// Replace the salary systems linked to a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSalaryAssign {
    pub salary_system_ids: Vec<i64>,
}
