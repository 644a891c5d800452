//! Menu Repository

use super::{RepoError, RepoResult};
use shared::models::{Menu, MenuCreate, MenuUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, name, category, price, sort_order, is_active, created_at";

/// Active menu items in display order
pub async fn find_all(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<Menu>> {
    let menus = sqlx::query_as::<_, Menu>(&format!(
        "SELECT {COLUMNS} FROM menus WHERE store_id = ? AND is_active = 1 ORDER BY sort_order, id"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(menus)
}

pub async fn find_by_id(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<Menu>> {
    let menu = sqlx::query_as::<_, Menu>(&format!(
        "SELECT {COLUMNS} FROM menus WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(menu)
}

pub async fn create(pool: &SqlitePool, store_id: i64, data: MenuCreate) -> RepoResult<Menu> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO menus (store_id, name, category, price, sort_order, is_active, created_at) VALUES (?, ?, ?, ?, ?, 1, ?) RETURNING id",
    )
    .bind(store_id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.price)
    .bind(data.sort_order)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu".into()))
}

pub async fn update(pool: &SqlitePool, store_id: i64, id: i64, data: MenuUpdate) -> RepoResult<Menu> {
    let rows = sqlx::query(
        "UPDATE menus SET name = COALESCE(?1, name), category = COALESCE(?2, category), price = COALESCE(?3, price), sort_order = COALESCE(?4, sort_order), is_active = COALESCE(?5, is_active) WHERE id = ?6 AND store_id = ?7",
    )
    .bind(data.name)
    .bind(data.category)
    .bind(data.price)
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(id)
    .bind(store_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu {id}")));
    }
    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu {id}")))
}

/// Soft delete; past orders keep their snapshot
pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE menus SET is_active = 0 WHERE id = ? AND store_id = ?")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu {id}")));
    }
    Ok(true)
}
