//! Permission Definitions
//!
//! Module-level RBAC. Reading is open to every logged-in user; writes are
//! gated per feature area.

use shared::error::ErrorCode;

use super::CurrentUser;
use crate::utils::{AppError, AppResult};

/// Grantable permissions
///
/// `all` is not in this list; only the system admin role carries it.
pub const ALL_PERMISSIONS: &[&str] = &[
    "tables:manage",   // floor layout
    "sessions:manage", // open / move / close sessions
    "casts:manage",    // assignments and rotation
    "orders:manage",
    "menus:manage",
    "profiles:manage",
    "roles:manage",
    "salary:manage",   // salary systems
    "settings:manage", // store and automation settings
    "payroll:view",
    "timecard:use",    // tablet timecard access
];

/// Permissions only system roles may carry
pub const ADMIN_ONLY_PERMISSIONS: &[&str] = &["all"];

/// Validate a permission string
///
/// `x:*` is valid when `x` is a known permission prefix.
pub fn is_valid_permission(permission: &str) -> bool {
    if ALL_PERMISSIONS.contains(&permission) || ADMIN_ONLY_PERMISSIONS.contains(&permission) {
        return true;
    }
    match permission.strip_suffix(":*") {
        Some(prefix) => ALL_PERMISSIONS
            .iter()
            .any(|p| p.split(':').next() == Some(prefix)),
        None => false,
    }
}

/// Permission ceiling: editors only grant what they hold themselves
///
/// Applies to role definitions and to attaching a role to a profile.
pub fn validate_permission_ceiling(current_user: &CurrentUser, permissions: &[String]) -> AppResult<()> {
    for perm in permissions {
        if !is_valid_permission(perm) {
            return Err(AppError::with_message(
                ErrorCode::InvalidPermission,
                format!("Invalid permission: {perm}"),
            ));
        }
        if ADMIN_ONLY_PERMISSIONS.contains(&perm.as_str()) && !current_user.is_admin() {
            return Err(AppError::with_message(
                ErrorCode::AdminRequired,
                format!("Only an administrator can grant '{perm}'"),
            ));
        }
        if !current_user.has_permission(perm) {
            return Err(AppError::with_message(
                ErrorCode::PermissionNotHeld,
                format!("Cannot grant permission '{perm}': you do not have it yourself"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role_name: &str, permissions: &[&str]) -> CurrentUser {
        CurrentUser {
            id: 1,
            store_id: 1,
            username: "u".into(),
            display_name: "U".into(),
            role_name: role_name.into(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn perms(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_valid_permissions() {
        assert!(is_valid_permission("tables:manage"));
        assert!(is_valid_permission("casts:*"));
        assert!(is_valid_permission("all"));
        assert!(!is_valid_permission("tables:read"));
        assert!(!is_valid_permission("printers:*"));
    }

    #[test]
    fn test_ceiling_rejects_unheld_permission() {
        let manager = user("manager", &["roles:manage", "casts:manage"]);
        assert!(validate_permission_ceiling(&manager, &perms(&["casts:manage"])).is_ok());

        let err = validate_permission_ceiling(&manager, &perms(&["salary:manage"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionNotHeld);
    }

    #[test]
    fn test_ceiling_rejects_unknown_and_admin_only() {
        let manager = user("manager", &["all"]);
        let err = validate_permission_ceiling(&manager, &perms(&["tables:read"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPermission);

        let err = validate_permission_ceiling(&manager, &perms(&["all"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::AdminRequired);

        let admin = user("admin", &[]);
        assert!(validate_permission_ceiling(&admin, &perms(&["all", "casts:*"])).is_ok());
    }
}
