//! Store Repository

use super::{RepoError, RepoResult};
use shared::models::{Store, StoreUpdate};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Store>> {
    let store = sqlx::query_as::<_, Store>("SELECT id, name, created_at FROM stores WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(store)
}

pub async fn update(pool: &SqlitePool, id: i64, data: StoreUpdate) -> RepoResult<Store> {
    let rows = sqlx::query("UPDATE stores SET name = COALESCE(?1, name) WHERE id = ?2")
        .bind(data.name)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Store {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Store {id}")))
}
