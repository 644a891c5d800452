//! Store Role Repository
//!
//! System roles (seeded by the initial migration) are read-only.

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{StoreRole, StoreRoleCreate, StoreRoleUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, name, description, permissions, is_system, is_active";

pub async fn find_all(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<StoreRole>> {
    let roles = sqlx::query_as::<_, StoreRole>(&format!(
        "SELECT {COLUMNS} FROM store_roles WHERE store_id = ? ORDER BY is_system DESC, id"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

pub async fn find_by_id(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<StoreRole>> {
    let role = sqlx::query_as::<_, StoreRole>(&format!(
        "SELECT {COLUMNS} FROM store_roles WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

fn name_taken(err: RepoError) -> RepoError {
    match err {
        RepoError::Duplicate(_) => {
            RepoError::Business(ErrorCode::RoleNameExists, "Role name already exists".into())
        }
        other => other,
    }
}

async fn require_editable(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<StoreRole> {
    let role = find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found")))?;
    if role.is_system {
        return Err(RepoError::Business(
            ErrorCode::RoleIsSystem,
            format!("System role '{}' cannot be modified", role.name),
        ));
    }
    Ok(role)
}

pub async fn create(pool: &SqlitePool, store_id: i64, data: StoreRoleCreate) -> RepoResult<StoreRole> {
    let permissions = serde_json::to_string(&data.permissions)?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO store_roles (store_id, name, description, permissions, is_system, is_active) VALUES (?, ?, ?, ?, 0, 1) RETURNING id",
    )
    .bind(store_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(permissions)
    .fetch_one(pool)
    .await
    .map_err(|e| name_taken(e.into()))?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

pub async fn update(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    data: StoreRoleUpdate,
) -> RepoResult<StoreRole> {
    require_editable(pool, store_id, id).await?;
    let permissions = data
        .permissions
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        "UPDATE store_roles SET name = COALESCE(?1, name), description = COALESCE(?2, description), permissions = COALESCE(?3, permissions), is_active = COALESCE(?4, is_active) WHERE id = ?5 AND store_id = ?6",
    )
    .bind(data.name)
    .bind(data.description)
    .bind(permissions)
    .bind(data.is_active)
    .bind(id)
    .bind(store_id)
    .execute(pool)
    .await
    .map_err(|e| name_taken(e.into()))?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found")))
}

pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<bool> {
    let role = require_editable(pool, store_id, id).await?;

    let in_use: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE store_role_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if in_use > 0 {
        return Err(RepoError::Business(
            ErrorCode::RoleInUse,
            format!("Role '{}' is assigned to {in_use} profile(s)", role.name),
        ));
    }

    sqlx::query("DELETE FROM store_roles WHERE id = ? AND store_id = ?")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    Ok(true)
}
