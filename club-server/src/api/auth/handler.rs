//! Authentication Handlers

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use shared::client::{LoginRequest, LoginResponse, UserInfo};
use shared::error::ErrorCode;
use shared::models::ProfileRole;

use crate::auth::{CurrentUser, TokenSubject, password};
use crate::core::ServerState;
use crate::db::repository::{profile, store_role};
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/login
///
/// Unknown usernames and wrong passwords get the same error.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let credentials = profile::find_credentials(&state.pool, req.username.trim()).await?;

    // Fixed delay before looking at the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let Some(credentials) = credentials else {
        tracing::warn!(username = %req.username, "Login failed - user not found");
        return Err(AppError::invalid_credentials());
    };
    let profile = credentials.profile;

    let password_valid = match &credentials.password_hash {
        Some(hash) => password::verify_password(&req.password, hash)
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?,
        None => false,
    };
    if !password_valid {
        tracing::warn!(username = %req.username, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }
    if !profile.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let (role_name, permissions) = match profile.store_role_id {
        Some(role_id) => {
            let role = store_role::find_by_id(&state.pool, profile.store_id, role_id)
                .await?
                .ok_or_else(|| AppError::internal("Role not found"))?;
            if !role.is_active {
                return Err(AppError::forbidden("Role has been disabled"));
            }
            (role.name, role.permissions)
        }
        None if profile.role == ProfileRole::Admin => ("admin".to_string(), vec!["all".to_string()]),
        None => (role_label(profile.role).to_string(), Vec::new()),
    };

    let username = profile.username.clone().unwrap_or_default();
    let token = state
        .get_jwt_service()
        .generate_token(&TokenSubject {
            profile_id: profile.id,
            store_id: profile.store_id,
            username: &username,
            display_name: &profile.display_name,
            role: &role_name,
            permissions: &permissions,
        })
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        user_id = profile.id,
        store_id = profile.store_id,
        username = %username,
        role = %role_name,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            id: profile.id,
            username,
            display_name: profile.display_name,
            store_id: profile.store_id,
            role_name,
            permissions,
        },
    }))
}

fn role_label(role: ProfileRole) -> &'static str {
    match role {
        ProfileRole::Cast => "cast",
        ProfileRole::Staff => "staff",
        ProfileRole::Guest => "guest",
        ProfileRole::Admin => "admin",
    }
}

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<UserInfo> {
    Json(UserInfo {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        store_id: user.store_id,
        role_name: user.role_name,
        permissions: user.permissions,
    })
}
