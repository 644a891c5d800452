//! Database Module
//!
//! SQLite connection pool, migrations and first-run bootstrap

pub mod repository;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;

use crate::auth::password;
use repository::{RepoError, RepoResult};

/// Store created by the initial migration
pub const DEFAULT_STORE_ID: i64 = 1;

/// Database service - owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database file with WAL and run migrations
    pub async fn new(db_path: &str) -> RepoResult<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| RepoError::Database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5))
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| RepoError::Database(format!("Failed to open database: {e}")))?;

        tracing::info!(path = %db_path, "Database connection established (SQLite WAL, busy_timeout=5000ms)");

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Single-connection in-memory database with migrations applied
    ///
    /// Every connection to `:memory:` is a separate database, so the pool
    /// is pinned to one connection that never expires.
    pub async fn in_memory() -> RepoResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| RepoError::Database(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> RepoResult<()> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| RepoError::Database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Create the administrator profile on first run
    ///
    /// No-op when a profile with `username` already exists.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> RepoResult<()> {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        if exists > 0 {
            return Ok(());
        }

        let role_id: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM store_roles WHERE store_id = ? AND name = 'admin' AND is_system = 1",
        )
        .bind(DEFAULT_STORE_ID)
        .fetch_optional(&self.pool)
        .await?;

        let hash = password::hash_password(password)
            .map_err(|e| RepoError::Database(format!("Failed to hash admin password: {e}")))?;

        sqlx::query(
            "INSERT INTO profiles (store_id, display_name, role, store_role_id, username, password_hash, is_active, created_at) VALUES (?, 'Administrator', 'admin', ?, ?, ?, 1, ?)",
        )
        .bind(DEFAULT_STORE_ID)
        .bind(role_id)
        .bind(username)
        .bind(hash)
        .bind(shared::util::now_millis())
        .execute(&self.pool)
        .await?;

        tracing::info!(username = %username, "Bootstrap administrator created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_seeds_default_store() {
        let db = DbService::in_memory().await.unwrap();
        let roles: Vec<String> =
            sqlx::query_scalar("SELECT name FROM store_roles WHERE store_id = 1 ORDER BY id")
                .fetch_all(&db.pool)
                .await
                .unwrap();
        assert_eq!(roles, vec!["admin", "manager", "staff"]);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_idempotent() {
        let db = DbService::in_memory().await.unwrap();
        db.bootstrap_admin("admin", "pw").await.unwrap();
        db.bootstrap_admin("admin", "other").await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE username = 'admin'")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_file_database_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("club.db");
        let path = path.to_string_lossy();
        {
            let db = DbService::new(&path).await.unwrap();
            db.bootstrap_admin("admin", "pw").await.unwrap();
            db.pool.close().await;
        }
        // migrations are not re-applied and data survives
        let db = DbService::new(&path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
