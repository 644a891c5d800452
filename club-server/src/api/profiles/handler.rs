//! Profile Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{
    Profile, ProfileCreate, ProfileRole, ProfileSalaryAssign, ProfileSalarySystem, ProfileUpdate,
};

use crate::auth::permissions::validate_permission_ceiling;
use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::{profile, store_role};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_USERNAME_LEN, MIN_PASSWORD_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "profile";

/// Query filter for profile listing
#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    role: Option<ProfileRole>,
}

fn validate_username(username: &Option<String>) -> AppResult<()> {
    if let Some(username) = username {
        validate_required_text(username, "username", MAX_USERNAME_LEN)?;
        if username.chars().any(char::is_whitespace) {
            return Err(AppError::validation("username must not contain whitespace"));
        }
    }
    Ok(())
}

/// Validate and hash an optional plain password
fn hash_optional_password(plain: &Option<String>) -> AppResult<Option<String>> {
    let Some(plain) = plain else {
        return Ok(None);
    };
    let len = plain.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AppError::validation(format!(
            "password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters"
        )));
    }
    password::hash_password(plain)
        .map(Some)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

fn require_admin_for(current_user: &CurrentUser, role: Option<ProfileRole>) -> AppResult<()> {
    if role == Some(ProfileRole::Admin) && !current_user.is_admin() {
        return Err(AppError::with_message(
            ErrorCode::AdminRequired,
            "Only an administrator can manage admin profiles",
        ));
    }
    Ok(())
}

/// A store role may only be attached by someone holding all of its permissions
async fn check_store_role_grant(
    state: &ServerState,
    current_user: &CurrentUser,
    store_role_id: Option<i64>,
) -> AppResult<()> {
    let Some(role_id) = store_role_id else {
        return Ok(());
    };
    let role = store_role::find_by_id(&state.pool, current_user.store_id, role_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::RoleNotFound, format!("Role {role_id} not found"))
        })?;
    validate_permission_ceiling(current_user, &role.permissions)
}

/// GET /api/profiles?role=cast - active profiles
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<ProfileQuery>,
) -> AppResult<Json<Vec<Profile>>> {
    let profiles = profile::find_all(&state.pool, current_user.store_id, query.role).await?;
    Ok(Json(profiles))
}

/// GET /api/profiles/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Profile>> {
    let found = profile::find_by_id(&state.pool, current_user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Profile {id}")))?;
    Ok(Json(found))
}

/// POST /api/profiles
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ProfileCreate>,
) -> AppResult<Json<Profile>> {
    validate_required_text(&payload.display_name, "display_name", MAX_NAME_LEN)?;
    validate_username(&payload.username)?;
    if payload.password.is_some() && payload.username.is_none() {
        return Err(AppError::validation("password requires a username"));
    }
    require_admin_for(&current_user, Some(payload.role))?;
    check_store_role_grant(&state, &current_user, payload.store_role_id).await?;
    let password_hash = hash_optional_password(&payload.password)?;

    let created = profile::create(&state.pool, current_user.store_id, payload, password_hash).await?;
    tracing::info!(
        user_id = current_user.id,
        profile_id = created.id,
        role = ?created.role,
        "Profile created"
    );
    state.notify_change(RESOURCE);
    Ok(Json(created))
}

/// PUT /api/profiles/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ProfileUpdate>,
) -> AppResult<Json<Profile>> {
    if let Some(name) = &payload.display_name {
        validate_required_text(name, "display_name", MAX_NAME_LEN)?;
    }
    validate_username(&payload.username)?;
    require_admin_for(&current_user, payload.role)?;

    // editing someone above the editor's own ceiling is a grant too
    let existing = profile::find_by_id(&state.pool, current_user.store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Profile {id}")))?;
    require_admin_for(&current_user, Some(existing.role))?;
    check_store_role_grant(&state, &current_user, existing.store_role_id).await?;
    check_store_role_grant(&state, &current_user, payload.store_role_id).await?;

    let password_hash = hash_optional_password(&payload.password)?;

    let updated =
        profile::update(&state.pool, current_user.store_id, id, payload, password_hash).await?;
    tracing::info!(user_id = current_user.id, profile_id = id, "Profile updated");
    state.notify_change(RESOURCE);
    Ok(Json(updated))
}

/// DELETE /api/profiles/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if id == current_user.id {
        return Err(AppError::validation("Cannot delete your own profile"));
    }
    let result = profile::delete(&state.pool, current_user.store_id, id).await?;
    tracing::info!(user_id = current_user.id, profile_id = id, "Profile deleted");
    state.notify_change(RESOURCE);
    Ok(Json(result))
}

/// GET /api/profiles/{id}/salary-systems
pub async fn get_salary_systems(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<ProfileSalarySystem>>> {
    let links = profile::get_salary_systems(&state.pool, current_user.store_id, id).await?;
    Ok(Json(links))
}

/// PUT /api/profiles/{id}/salary-systems - replace the assignment
pub async fn set_salary_systems(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ProfileSalaryAssign>,
) -> AppResult<Json<Vec<ProfileSalarySystem>>> {
    let links = profile::set_salary_systems(
        &state.pool,
        current_user.store_id,
        id,
        &payload.salary_system_ids,
    )
    .await?;
    tracing::info!(
        user_id = current_user.id,
        profile_id = id,
        systems = ?payload.salary_system_ids,
        "Salary systems assigned"
    );
    state.notify_change(RESOURCE);
    Ok(Json(links))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> CurrentUser {
        CurrentUser {
            id: 2,
            store_id: 1,
            username: "mgr".into(),
            display_name: "Manager".into(),
            role_name: "manager".into(),
            permissions: vec!["profiles:manage".into()],
        }
    }

    #[test]
    fn test_admin_profiles_need_admin() {
        let err = require_admin_for(&manager(), Some(ProfileRole::Admin)).unwrap_err();
        assert_eq!(err.code, ErrorCode::AdminRequired);
        assert!(require_admin_for(&manager(), Some(ProfileRole::Cast)).is_ok());
        assert!(require_admin_for(&manager(), None).is_ok());

        let admin = CurrentUser { role_name: "admin".into(), ..manager() };
        assert!(require_admin_for(&admin, Some(ProfileRole::Admin)).is_ok());
    }

    #[test]
    fn test_password_length_is_checked_before_hashing() {
        assert!(hash_optional_password(&None).unwrap().is_none());
        assert!(hash_optional_password(&Some("abc".into())).is_err());
        let hash = hash_optional_password(&Some("secret".into())).unwrap().unwrap();
        assert!(password::verify_password("secret", &hash).unwrap());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username(&None).is_ok());
        assert!(validate_username(&Some("mika".into())).is_ok());
        assert!(validate_username(&Some("mi ka".into())).is_err());
        assert!(validate_username(&Some("  ".into())).is_err());
    }
}
