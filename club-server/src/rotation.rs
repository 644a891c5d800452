//! Cast rotation scheduler (付け回し)
//!
//! Polls for serving assignments whose slot has run out and rotates them:
//! the expired cast ends and the next waiting cast for the same guest starts.
//! Rotation is a conditional update, so a tick overlapping a manual rotate
//! (or a slow previous tick) never double-rotates.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::core::ServerState;
use crate::db::repository::{RepoResult, cast_assignment};

const RESOURCE: &str = "cast_assignment";

/// Registered as `TaskKind::Periodic` in `start_background_tasks()`
pub struct CastRotationScheduler {
    state: ServerState,
    shutdown: CancellationToken,
}

impl CastRotationScheduler {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    pub async fn run(self) {
        let period = Duration::from_secs(self.state.config.rotation_poll_secs.max(1));
        tracing::info!(interval_secs = period.as_secs(), "Cast rotation scheduler started");

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.tick(shared::util::now_millis()).await {
                        Ok(0) => {}
                        Ok(rotated) => tracing::info!(rotated, "Cast rotation applied"),
                        Err(e) => tracing::error!(error = %e, "Cast rotation poll failed"),
                    }
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Cast rotation scheduler received shutdown signal");
                    return;
                }
            }
        }
    }

    /// One poll; returns how many assignments were rotated
    pub async fn tick(&self, now: i64) -> RepoResult<usize> {
        let expired = cast_assignment::find_expired_serving(&self.state.pool, now).await?;
        let mut rotated = 0;

        for assignment in expired {
            match cast_assignment::rotate(&self.state.pool, assignment.store_id, assignment.id, now).await {
                Ok(result) if result.rotated => {
                    rotated += 1;
                    tracing::debug!(
                        assignment_id = assignment.id,
                        session_id = assignment.table_session_id,
                        promoted = ?result.promoted.as_ref().map(|p| p.id),
                        "Rotated cast"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(assignment_id = assignment.id, error = %e, "Failed to rotate cast");
                }
            }
        }

        if rotated > 0 {
            self.state.notify_change(RESOURCE);
        }
        Ok(rotated)
    }
}
