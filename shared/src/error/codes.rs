//! Unified error codes for the club backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Store / settings errors
//! - 4xxx: Session and cast assignment errors
//! - 5xxx: Order and menu errors
//! - 6xxx: Salary system errors
//! - 7xxx: Table errors
//! - 8xxx: Profile and role errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can switch on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Unknown permission string
    InvalidPermission = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Editor does not hold the permission being granted
    PermissionNotHeld = 2004,

    // ==================== 3xxx: Store ====================
    /// Store not found
    StoreNotFound = 3001,
    /// Time value is not HH:MM
    InvalidTimeFormat = 3002,
    /// Rounding unit not supported
    InvalidRoundingUnit = 3003,

    // ==================== 4xxx: Session ====================
    /// Table session not found
    SessionNotFound = 4001,
    /// Table session is already closed
    SessionClosed = 4002,
    /// Cast assignment not found
    AssignmentNotFound = 4101,
    /// Cast is already active in the session
    CastAlreadyAssigned = 4102,
    /// Cast assignment has already ended
    AssignmentEnded = 4103,
    /// Profile is not a cast member
    ProfileNotCast = 4104,
    /// Profile is not a guest
    ProfileNotGuest = 4105,

    // ==================== 5xxx: Order ====================
    /// Order not found
    OrderNotFound = 5001,
    /// Quantity must be positive
    InvalidQuantity = 5002,
    /// Menu not found
    MenuNotFound = 5101,
    /// Menu is inactive
    MenuInactive = 5102,

    // ==================== 6xxx: Salary ====================
    /// Salary system not found
    SalarySystemNotFound = 6001,
    /// Salary system is assigned to profiles
    SalarySystemInUse = 6002,
    /// Back tier thresholds are missing or not strictly increasing
    InvalidTierOrder = 6003,
    /// Salary system target does not match the profile
    SalaryTargetMismatch = 6004,
    /// Profile has no salary system for the requested target
    NoSalarySystemAssigned = 6005,
    /// Deduction not found
    DeductionNotFound = 6006,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table name already exists
    TableNameExists = 7002,
    /// Table has an active session
    TableOccupied = 7003,

    // ==================== 8xxx: Profile ====================
    /// Profile not found
    ProfileNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// Role not found
    RoleNotFound = 8101,
    /// Role name already exists
    RoleNameExists = 8102,
    /// Role is in use
    RoleInUse = 8103,
    /// Cannot modify/delete system role
    RoleIsSystem = 8104,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::InvalidPermission => "Unknown permission",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::PermissionNotHeld => "Cannot grant a permission you do not hold",

            // Store
            ErrorCode::StoreNotFound => "Store not found",
            ErrorCode::InvalidTimeFormat => "Time must be in HH:MM format",
            ErrorCode::InvalidRoundingUnit => "Unsupported rounding unit",

            // Session
            ErrorCode::SessionNotFound => "Table session not found",
            ErrorCode::SessionClosed => "Table session is already closed",
            ErrorCode::AssignmentNotFound => "Cast assignment not found",
            ErrorCode::CastAlreadyAssigned => "Cast is already active in this session",
            ErrorCode::AssignmentEnded => "Cast assignment has already ended",
            ErrorCode::ProfileNotCast => "Profile is not a cast member",
            ErrorCode::ProfileNotGuest => "Profile is not a guest",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidQuantity => "Quantity must be positive",
            ErrorCode::MenuNotFound => "Menu not found",
            ErrorCode::MenuInactive => "Menu is inactive",

            // Salary
            ErrorCode::SalarySystemNotFound => "Salary system not found",
            ErrorCode::SalarySystemInUse => "Salary system is assigned to profiles",
            ErrorCode::InvalidTierOrder => "Back tier thresholds must be strictly increasing",
            ErrorCode::SalaryTargetMismatch => "Salary system target does not match the profile",
            ErrorCode::NoSalarySystemAssigned => "No salary system assigned",
            ErrorCode::DeductionNotFound => "Deduction not found",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNameExists => "Table name already exists",
            ErrorCode::TableOccupied => "Table has an active session",

            // Profile
            ErrorCode::ProfileNotFound => "Profile not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleNameExists => "Role name already exists",
            ErrorCode::RoleInUse => "Role is currently in use",
            ErrorCode::RoleIsSystem => "Cannot modify system role",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::InvalidPermission),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::PermissionNotHeld),

            // Store
            3001 => Ok(ErrorCode::StoreNotFound),
            3002 => Ok(ErrorCode::InvalidTimeFormat),
            3003 => Ok(ErrorCode::InvalidRoundingUnit),

            // Session
            4001 => Ok(ErrorCode::SessionNotFound),
            4002 => Ok(ErrorCode::SessionClosed),
            4101 => Ok(ErrorCode::AssignmentNotFound),
            4102 => Ok(ErrorCode::CastAlreadyAssigned),
            4103 => Ok(ErrorCode::AssignmentEnded),
            4104 => Ok(ErrorCode::ProfileNotCast),
            4105 => Ok(ErrorCode::ProfileNotGuest),

            // Order
            5001 => Ok(ErrorCode::OrderNotFound),
            5002 => Ok(ErrorCode::InvalidQuantity),
            5101 => Ok(ErrorCode::MenuNotFound),
            5102 => Ok(ErrorCode::MenuInactive),

            // Salary
            6001 => Ok(ErrorCode::SalarySystemNotFound),
            6002 => Ok(ErrorCode::SalarySystemInUse),
            6003 => Ok(ErrorCode::InvalidTierOrder),
            6004 => Ok(ErrorCode::SalaryTargetMismatch),
            6005 => Ok(ErrorCode::NoSalarySystemAssigned),
            6006 => Ok(ErrorCode::DeductionNotFound),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableNameExists),
            7003 => Ok(ErrorCode::TableOccupied),

            // Profile
            8001 => Ok(ErrorCode::ProfileNotFound),
            8002 => Ok(ErrorCode::UsernameExists),
            8101 => Ok(ErrorCode::RoleNotFound),
            8102 => Ok(ErrorCode::RoleNameExists),
            8103 => Ok(ErrorCode::RoleInUse),
            8104 => Ok(ErrorCode::RoleIsSystem),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
