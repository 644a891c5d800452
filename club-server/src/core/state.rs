use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use shared::models::SyncStatus;
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::rotation::CastRotationScheduler;

/// Resource version manager
///
/// Lock-free per-resource counters on a `DashMap`. Every write bumps the
/// counter of the resource it touched, so clients can poll
/// `GET /api/sync/versions` and only re-fetch what moved.
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// Increment a resource's version and return the new value
    ///
    /// Unknown resources start at 0, so the first call returns 1.
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current version (0 when never bumped)
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.versions
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// Server state - shared handles to every service
///
/// Cloning is cheap: the pool and services are reference counted.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | immutable configuration |
/// | pool | SQLite pool |
/// | jwt_service | token issue/validation |
/// | resource_versions | sync counters |
/// | epoch | instance id, changes on restart |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub resource_versions: Arc<ResourceVersions>,
    pub epoch: String,
}

impl ServerState {
    /// Build state around an existing pool (used by tests)
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
            resource_versions: Arc::new(ResourceVersions::new()),
            epoch: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Initialize server state
    ///
    /// 1. Working directory
    /// 2. Database (migrations, bootstrap admin)
    /// 3. Services
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir()?;

        let db = DbService::new(&config.database_path).await?;
        if let Some(password) = &config.admin_password {
            db.bootstrap_admin(&config.admin_username, password).await?;
        } else {
            tracing::warn!("ADMIN_PASSWORD not set, skipping admin bootstrap");
        }

        Ok(Self::new(config.clone(), db.pool))
    }

    /// Register background tasks
    ///
    /// - cast rotation poll (periodic)
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let scheduler = CastRotationScheduler::new(self.clone(), tasks.shutdown_token());
        tasks.spawn("cast_rotation", TaskKind::Periodic, scheduler.run());

        tasks.log_summary();
        tasks
    }

    /// Get the JWT service
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Record a change to `resource`; returns the new version
    pub fn notify_change(&self, resource: &str) -> u64 {
        let version = self.resource_versions.increment(resource);
        tracing::debug!(resource = %resource, version, "Resource changed");
        version
    }

    pub fn sync_status(&self) -> SyncStatus {
        SyncStatus {
            epoch: self.epoch.clone(),
            versions: self.resource_versions.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_versions_increment() {
        let versions = ResourceVersions::new();
        assert_eq!(versions.get("table"), 0);
        assert_eq!(versions.increment("table"), 1);
        assert_eq!(versions.increment("table"), 2);
        assert_eq!(versions.increment("menu"), 1);
        let snapshot = versions.snapshot();
        assert_eq!(snapshot.get("table"), Some(&2));
        assert_eq!(snapshot.len(), 2);
    }
}
