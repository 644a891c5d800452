//! Profile Repository
//!
//! Casts, staff, guests and admins share one table. Password hashes are only
//! read through [`find_credentials`].

use super::{RepoError, RepoResult, salary_system, store_role};
use shared::error::ErrorCode;
use shared::models::{
    Profile, ProfileCreate, ProfileRole, ProfileSalarySystem, ProfileUpdate,
};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, display_name, role, store_role_id, username, is_active, created_at";

/// Profile row together with its password hash (login only)
#[derive(Debug, sqlx::FromRow)]
pub struct ProfileCredentials {
    #[sqlx(flatten)]
    pub profile: Profile,
    pub password_hash: Option<String>,
}

/// Active profiles, optionally of one role
pub async fn find_all(
    pool: &SqlitePool,
    store_id: i64,
    role: Option<ProfileRole>,
) -> RepoResult<Vec<Profile>> {
    let profiles = sqlx::query_as::<_, Profile>(&format!(
        "SELECT {COLUMNS} FROM profiles WHERE store_id = ?1 AND is_active = 1 AND (?2 IS NULL OR role = ?2) ORDER BY display_name, id"
    ))
    .bind(store_id)
    .bind(role)
    .fetch_all(pool)
    .await?;
    Ok(profiles)
}

pub async fn find_by_id(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(&format!(
        "SELECT {COLUMNS} FROM profiles WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(profile)
}

/// Login lookup; usernames are unique across stores
pub async fn find_credentials(
    pool: &SqlitePool,
    username: &str,
) -> RepoResult<Option<ProfileCredentials>> {
    let row = sqlx::query_as::<_, ProfileCredentials>(&format!(
        "SELECT {COLUMNS}, password_hash FROM profiles WHERE username = ?"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

fn username_taken(err: RepoError) -> RepoError {
    match err {
        RepoError::Duplicate(_) => {
            RepoError::Business(ErrorCode::UsernameExists, "Username already exists".into())
        }
        other => other,
    }
}

async fn ensure_role_exists(pool: &SqlitePool, store_id: i64, role_id: Option<i64>) -> RepoResult<()> {
    if let Some(role_id) = role_id
        && store_role::find_by_id(pool, store_id, role_id).await?.is_none()
    {
        return Err(RepoError::Business(
            ErrorCode::RoleNotFound,
            format!("Role {role_id} not found"),
        ));
    }
    Ok(())
}

/// Create a profile; `password_hash` is already hashed by the caller
pub async fn create(
    pool: &SqlitePool,
    store_id: i64,
    data: ProfileCreate,
    password_hash: Option<String>,
) -> RepoResult<Profile> {
    ensure_role_exists(pool, store_id, data.store_role_id).await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO profiles (store_id, display_name, role, store_role_id, username, password_hash, is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, 1, ?) RETURNING id",
    )
    .bind(store_id)
    .bind(&data.display_name)
    .bind(data.role)
    .bind(data.store_role_id)
    .bind(&data.username)
    .bind(password_hash)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await
    .map_err(|e| username_taken(e.into()))?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create profile".into()))
}

pub async fn update(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    data: ProfileUpdate,
    password_hash: Option<String>,
) -> RepoResult<Profile> {
    let current = find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Profile {id}")))?;
    ensure_role_exists(pool, store_id, data.store_role_id).await?;
    let role_change = data.role.filter(|role| *role != current.role);

    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE profiles SET display_name = COALESCE(?1, display_name), role = COALESCE(?2, role), store_role_id = COALESCE(?3, store_role_id), username = COALESCE(?4, username), password_hash = COALESCE(?5, password_hash), is_active = COALESCE(?6, is_active) WHERE id = ?7 AND store_id = ?8",
    )
    .bind(data.display_name)
    .bind(data.role)
    .bind(data.store_role_id)
    .bind(data.username)
    .bind(password_hash)
    .bind(data.is_active)
    .bind(id)
    .bind(store_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| username_taken(e.into()))?;

    // salary links must keep paying the profile's kind
    if let Some(role) = role_change {
        let removed = sqlx::query("DELETE FROM profile_salary_systems WHERE profile_id = ? AND target IS NOT ?")
            .bind(id)
            .bind(role.salary_target())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed > 0 {
            tracing::info!(profile_id = id, removed, "Dropped salary links after role change");
        }
    }
    tx.commit().await?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Profile {id}")))
}

/// Soft delete; history (assignments, orders) keeps pointing at the row
pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE profiles SET is_active = 0 WHERE id = ? AND store_id = ?")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Profile {id}")));
    }
    Ok(true)
}

pub async fn get_salary_systems(
    pool: &SqlitePool,
    store_id: i64,
    profile_id: i64,
) -> RepoResult<Vec<ProfileSalarySystem>> {
    if find_by_id(pool, store_id, profile_id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Profile {profile_id}")));
    }
    let links = sqlx::query_as::<_, ProfileSalarySystem>(
        "SELECT profile_id, salary_system_id, target FROM profile_salary_systems WHERE profile_id = ? ORDER BY target",
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await?;
    Ok(links)
}

/// Replace the profile's salary systems
///
/// Each system must pay the profile's kind (cast or staff), and a profile
/// holds at most one system per target.
pub async fn set_salary_systems(
    pool: &SqlitePool,
    store_id: i64,
    profile_id: i64,
    salary_system_ids: &[i64],
) -> RepoResult<Vec<ProfileSalarySystem>> {
    let profile = find_by_id(pool, store_id, profile_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Profile {profile_id}")))?;
    let expected = profile.role.salary_target();

    let mut links: Vec<ProfileSalarySystem> = Vec::with_capacity(salary_system_ids.len());
    for &system_id in salary_system_ids {
        let system = salary_system::find_by_id(pool, store_id, system_id)
            .await?
            .ok_or_else(|| {
                RepoError::Business(
                    ErrorCode::SalarySystemNotFound,
                    format!("Salary system {system_id} not found"),
                )
            })?;
        if Some(system.target) != expected {
            return Err(RepoError::Business(
                ErrorCode::SalaryTargetMismatch,
                format!("Salary system '{}' cannot be assigned to this profile", system.name),
            ));
        }
        if links.iter().any(|l| l.target == system.target) {
            return Err(RepoError::Validation(
                "At most one salary system per target".into(),
            ));
        }
        links.push(ProfileSalarySystem {
            profile_id,
            salary_system_id: system_id,
            target: system.target,
        });
    }

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM profile_salary_systems WHERE profile_id = ?")
        .bind(profile_id)
        .execute(&mut *tx)
        .await?;
    for link in &links {
        sqlx::query(
            "INSERT INTO profile_salary_systems (profile_id, salary_system_id, target) VALUES (?, ?, ?)",
        )
        .bind(link.profile_id)
        .bind(link.salary_system_id)
        .bind(link.target)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(links)
}
