//! Table Repository (floor layout)

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Table, TableCreate, TableLayoutItem, TableUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, name, x, y, width, height, shape, capacity, is_active";

pub async fn find_all(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<Table>> {
    let tables = sqlx::query_as::<_, Table>(&format!(
        "SELECT {COLUMNS} FROM tables WHERE store_id = ? AND is_active = 1 ORDER BY id"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

pub async fn find_by_id(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<Table>> {
    let table = sqlx::query_as::<_, Table>(&format!(
        "SELECT {COLUMNS} FROM tables WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

/// Active table with this name, if any
pub async fn find_by_name(
    pool: &SqlitePool,
    store_id: i64,
    name: &str,
) -> RepoResult<Option<Table>> {
    let table = sqlx::query_as::<_, Table>(&format!(
        "SELECT {COLUMNS} FROM tables WHERE store_id = ? AND name = ? AND is_active = 1 LIMIT 1"
    ))
    .bind(store_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

async fn ensure_name_free(
    pool: &SqlitePool,
    store_id: i64,
    name: &str,
    except_id: Option<i64>,
) -> RepoResult<()> {
    if let Some(existing) = find_by_name(pool, store_id, name).await?
        && Some(existing.id) != except_id
    {
        return Err(RepoError::Business(
            ErrorCode::TableNameExists,
            format!("Table name '{name}' already exists"),
        ));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, store_id: i64, data: TableCreate) -> RepoResult<Table> {
    ensure_name_free(pool, store_id, &data.name, None).await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO tables (store_id, name, x, y, width, height, shape, capacity) VALUES (?, ?, ?, ?, COALESCE(?, 100), COALESCE(?, 100), COALESCE(?, 'rect'), COALESCE(?, 4)) RETURNING id",
    )
    .bind(store_id)
    .bind(&data.name)
    .bind(data.x)
    .bind(data.y)
    .bind(data.width)
    .bind(data.height)
    .bind(data.shape)
    .bind(data.capacity)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create table".into()))
}

pub async fn update(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    data: TableUpdate,
) -> RepoResult<Table> {
    if let Some(name) = &data.name {
        ensure_name_free(pool, store_id, name, Some(id)).await?;
    }

    let rows = sqlx::query(
        "UPDATE tables SET name = COALESCE(?1, name), x = COALESCE(?2, x), y = COALESCE(?3, y), width = COALESCE(?4, width), height = COALESCE(?5, height), shape = COALESCE(?6, shape), capacity = COALESCE(?7, capacity), is_active = COALESCE(?8, is_active) WHERE id = ?9 AND store_id = ?10",
    )
    .bind(data.name)
    .bind(data.x)
    .bind(data.y)
    .bind(data.width)
    .bind(data.height)
    .bind(data.shape)
    .bind(data.capacity)
    .bind(data.is_active)
    .bind(id)
    .bind(store_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id}")));
    }
    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id}")))
}

/// Soft delete; rejected while a session is open on the table
pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<bool> {
    if find_by_id(pool, store_id, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Table {id}")));
    }

    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM table_sessions WHERE table_id = ? AND status = 'active'",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if active > 0 {
        return Err(RepoError::Business(
            ErrorCode::TableOccupied,
            format!("Table {id} has an active session"),
        ));
    }

    sqlx::query("UPDATE tables SET is_active = 0 WHERE id = ? AND store_id = ?")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    Ok(true)
}

/// Bulk position/size save from the layout editor
///
/// All-or-nothing: an unknown id rolls the whole batch back.
pub async fn update_layout(
    pool: &SqlitePool,
    store_id: i64,
    items: &[TableLayoutItem],
) -> RepoResult<Vec<Table>> {
    let mut tx = pool.begin().await?;

    for item in items {
        let rows = sqlx::query(
            "UPDATE tables SET x = ?1, y = ?2, width = COALESCE(?3, width), height = COALESCE(?4, height) WHERE id = ?5 AND store_id = ?6",
        )
        .bind(item.x)
        .bind(item.y)
        .bind(item.width)
        .bind(item.height)
        .bind(item.id)
        .bind(store_id)
        .execute(&mut *tx)
        .await?;

        if rows.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Table {}", item.id)));
        }
    }

    tx.commit().await?;
    find_all(pool, store_id).await
}
