//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Store / settings errors (3xxx)
    Store,
    /// Session and cast errors (4xxx)
    Session,
    /// Order and menu errors (5xxx)
    Order,
    /// Salary errors (6xxx)
    Salary,
    /// Table errors (7xxx)
    Table,
    /// Profile and role errors (8xxx)
    Profile,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Store,
            4000..5000 => Self::Session,
            5000..6000 => Self::Order,
            6000..7000 => Self::Salary,
            7000..8000 => Self::Table,
            8000..9000 => Self::Profile,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Store => "store",
            Self::Session => "session",
            Self::Order => "order",
            Self::Salary => "salary",
            Self::Table => "table",
            Self::Profile => "profile",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
