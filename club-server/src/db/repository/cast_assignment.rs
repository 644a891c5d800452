//! Cast Assignment Repository (付け回し)
//!
//! Assignments live inside a session. Guest entries share the grid with casts
//! and are stored as `cast_id == guest_id` rows.

use super::{RepoError, RepoResult, profile, settings, table_session};
use shared::error::ErrorCode;
use shared::models::{
    CastAssignment, CastAssignmentCreate, CastAssignmentUpdate, CastPosition, CastStatus,
    GuestEntryCreate, ProfileRole, RotationResult,
};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, table_session_id, cast_id, guest_id, status, grid_x, grid_y, start_time, end_time, created_at, updated_at";

pub async fn find_by_session(
    pool: &SqlitePool,
    store_id: i64,
    session_id: i64,
) -> RepoResult<Vec<CastAssignment>> {
    let rows = sqlx::query_as::<_, CastAssignment>(&format!(
        "SELECT {COLUMNS} FROM cast_assignments WHERE table_session_id = ? AND store_id = ? ORDER BY id"
    ))
    .bind(session_id)
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
) -> RepoResult<Option<CastAssignment>> {
    let row = sqlx::query_as::<_, CastAssignment>(&format!(
        "SELECT {COLUMNS} FROM cast_assignments WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

async fn require(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<CastAssignment> {
    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Assignment {id}")))
}

fn ensure_not_ended(assignment: &CastAssignment) -> RepoResult<()> {
    if assignment.status == CastStatus::Ended {
        return Err(RepoError::Business(
            ErrorCode::AssignmentEnded,
            format!("Assignment {} has ended", assignment.id),
        ));
    }
    Ok(())
}

async fn ensure_role(
    pool: &SqlitePool,
    store_id: i64,
    profile_id: i64,
    role: ProfileRole,
) -> RepoResult<()> {
    let profile = profile::find_by_id(pool, store_id, profile_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| RepoError::NotFound(format!("Profile {profile_id}")))?;

    if profile.role != role {
        let (code, kind) = match role {
            ProfileRole::Guest => (ErrorCode::ProfileNotGuest, "guest"),
            _ => (ErrorCode::ProfileNotCast, "cast"),
        };
        return Err(RepoError::Business(
            code,
            format!("Profile {profile_id} is not a {kind}"),
        ));
    }
    Ok(())
}

/// A cast (or guest entry) may hold only one live row per session
async fn ensure_not_assigned(pool: &SqlitePool, session_id: i64, cast_id: i64) -> RepoResult<()> {
    let live: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM cast_assignments WHERE table_session_id = ? AND cast_id = ? AND status != 'ended'",
    )
    .bind(session_id)
    .bind(cast_id)
    .fetch_one(pool)
    .await?;
    if live > 0 {
        return Err(RepoError::Business(
            ErrorCode::CastAlreadyAssigned,
            format!("Profile {cast_id} is already assigned to session {session_id}"),
        ));
    }
    Ok(())
}

/// End of a serving slot started at `start`
fn slot_end(start: i64, rotation_minutes: i32) -> Option<i64> {
    (rotation_minutes > 0).then(|| start + i64::from(rotation_minutes) * 60_000)
}

pub async fn create(
    pool: &SqlitePool,
    store_id: i64,
    session_id: i64,
    data: CastAssignmentCreate,
) -> RepoResult<CastAssignment> {
    table_session::require_active(pool, store_id, session_id).await?;
    ensure_role(pool, store_id, data.cast_id, ProfileRole::Cast).await?;
    if let Some(guest_id) = data.guest_id {
        ensure_role(pool, store_id, guest_id, ProfileRole::Guest).await?;
    }
    ensure_not_assigned(pool, session_id, data.cast_id).await?;

    let now = shared::util::now_millis();
    let status = data.status.unwrap_or_default();
    let (start_time, end_time) = if status == CastStatus::Serving {
        let rotation = settings::get_settings(pool, store_id).await?.rotation_minutes;
        let start = data.start_time.unwrap_or(now);
        (Some(start), data.end_time.or_else(|| slot_end(start, rotation)))
    } else {
        (data.start_time, data.end_time)
    };

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO cast_assignments (store_id, table_session_id, cast_id, guest_id, status, grid_x, grid_y, start_time, end_time, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10) RETURNING id",
    )
    .bind(store_id)
    .bind(session_id)
    .bind(data.cast_id)
    .bind(data.guest_id)
    .bind(status)
    .bind(data.grid_x)
    .bind(data.grid_y)
    .bind(start_time)
    .bind(end_time)
    .bind(now)
    .fetch_one(pool)
    .await?;

    require(pool, store_id, id).await
}

/// Seat a guest on the grid as a self-referential entry
pub async fn create_guest_entry(
    pool: &SqlitePool,
    store_id: i64,
    session_id: i64,
    data: GuestEntryCreate,
) -> RepoResult<CastAssignment> {
    table_session::require_active(pool, store_id, session_id).await?;
    ensure_role(pool, store_id, data.guest_id, ProfileRole::Guest).await?;
    ensure_not_assigned(pool, session_id, data.guest_id).await?;

    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO cast_assignments (store_id, table_session_id, cast_id, guest_id, status, grid_x, grid_y, start_time, created_at, updated_at) VALUES (?1, ?2, ?3, ?3, 'serving', ?4, ?5, ?6, ?6, ?6) RETURNING id",
    )
    .bind(store_id)
    .bind(session_id)
    .bind(data.guest_id)
    .bind(data.grid_x)
    .bind(data.grid_y)
    .bind(now)
    .fetch_one(pool)
    .await?;

    require(pool, store_id, id).await
}

pub async fn update(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    data: CastAssignmentUpdate,
) -> RepoResult<CastAssignment> {
    let current = require(pool, store_id, id).await?;
    ensure_not_ended(&current)?;
    table_session::require_active(pool, store_id, current.table_session_id).await?;
    if let Some(guest_id) = data.guest_id {
        ensure_role(pool, store_id, guest_id, ProfileRole::Guest).await?;
    }

    let now = shared::util::now_millis();
    let status = data.status.unwrap_or(current.status);
    let mut start_time = data.start_time.or(current.start_time);
    let mut end_time = data.end_time.or(current.end_time);
    match status {
        CastStatus::Serving => {
            let start = *start_time.get_or_insert(now);
            // a cast promoted by hand still gets a slot the scheduler can expire
            if end_time.is_none() && current.status != CastStatus::Serving {
                let rotation = settings::get_settings(pool, store_id).await?.rotation_minutes;
                end_time = slot_end(start, rotation);
            }
        }
        CastStatus::Ended if end_time.is_none_or(|end| end > now) => end_time = Some(now),
        _ => {}
    }

    sqlx::query(
        "UPDATE cast_assignments SET status = ?1, guest_id = COALESCE(?2, guest_id), grid_x = COALESCE(?3, grid_x), grid_y = COALESCE(?4, grid_y), start_time = ?5, end_time = ?6, updated_at = ?7 WHERE id = ?8 AND store_id = ?9",
    )
    .bind(status)
    .bind(data.guest_id)
    .bind(data.grid_x)
    .bind(data.grid_y)
    .bind(start_time)
    .bind(end_time)
    .bind(now)
    .bind(id)
    .bind(store_id)
    .execute(pool)
    .await?;

    require(pool, store_id, id).await
}

/// Drag-and-drop move on the seating grid
pub async fn move_position(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    position: CastPosition,
) -> RepoResult<CastAssignment> {
    let current = require(pool, store_id, id).await?;
    ensure_not_ended(&current)?;

    sqlx::query("UPDATE cast_assignments SET grid_x = ?, grid_y = ?, updated_at = ? WHERE id = ? AND store_id = ?")
        .bind(position.grid_x)
        .bind(position.grid_y)
        .bind(shared::util::now_millis())
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;

    require(pool, store_id, id).await
}

/// End an assignment now (keeps an earlier scheduled end)
pub async fn end(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<CastAssignment> {
    let current = require(pool, store_id, id).await?;
    ensure_not_ended(&current)?;

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE cast_assignments SET status = 'ended', end_time = CASE WHEN end_time IS NULL OR end_time > ?1 THEN ?1 ELSE end_time END, updated_at = ?1 WHERE id = ?2 AND store_id = ?3",
    )
    .bind(now)
    .bind(id)
    .bind(store_id)
    .execute(pool)
    .await?;

    require(pool, store_id, id).await
}

pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM cast_assignments WHERE id = ? AND store_id = ?")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Assignment {id}")));
    }
    Ok(true)
}

/// Serving assignments whose slot ended at or before `now`, across all stores
pub async fn find_expired_serving(pool: &SqlitePool, now: i64) -> RepoResult<Vec<CastAssignment>> {
    let rows = sqlx::query_as::<_, CastAssignment>(
        "SELECT ca.id, ca.store_id, ca.table_session_id, ca.cast_id, ca.guest_id, ca.status, ca.grid_x, ca.grid_y, ca.start_time, ca.end_time, ca.created_at, ca.updated_at \
         FROM cast_assignments ca JOIN table_sessions ts ON ts.id = ca.table_session_id \
         WHERE ts.status = 'active' AND ca.status = 'serving' AND ca.end_time IS NOT NULL AND ca.end_time <= ? \
         ORDER BY ca.end_time, ca.id",
    )
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Rotate an expired serving assignment
///
/// The `serving → ended` transition is conditional, so of two overlapping
/// rotations only one sees an affected row; the other reports
/// `rotated: false` and changes nothing. On success the next waiting cast
/// for the same guest (grid row, then column, then id) starts serving.
pub async fn rotate(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    now: i64,
) -> RepoResult<RotationResult> {
    let current = require(pool, store_id, id).await?;
    let rotation_minutes = settings::get_settings(pool, store_id).await?.rotation_minutes;

    let mut tx = pool.begin().await?;

    let ended = sqlx::query(
        "UPDATE cast_assignments SET status = 'ended', updated_at = ?1 \
         WHERE id = ?2 AND store_id = ?3 AND status = 'serving' AND end_time IS NOT NULL AND end_time <= ?1",
    )
    .bind(now)
    .bind(id)
    .bind(store_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if ended == 0 {
        tx.rollback().await?;
        return Ok(RotationResult {
            rotated: false,
            ended: None,
            promoted: None,
        });
    }

    let next: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM cast_assignments \
         WHERE table_session_id = ?1 AND guest_id IS ?2 AND status = 'waiting' \
           AND (guest_id IS NULL OR guest_id != cast_id) \
         ORDER BY grid_y, grid_x, id LIMIT 1",
    )
    .bind(current.table_session_id)
    .bind(current.guest_id)
    .fetch_optional(&mut *tx)
    .await?;

    if let Some(next_id) = next {
        sqlx::query(
            "UPDATE cast_assignments SET status = 'serving', start_time = ?1, end_time = ?2, updated_at = ?1 WHERE id = ?3",
        )
        .bind(now)
        .bind(slot_end(now, rotation_minutes))
        .bind(next_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let promoted = match next {
        Some(next_id) => find_by_id(pool, store_id, next_id).await?,
        None => None,
    };
    Ok(RotationResult {
        rotated: true,
        ended: find_by_id(pool, store_id, id).await?,
        promoted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{STORE, pool, profile, session, table};
    use shared::models::Profile;

    fn waiting(cast: &Profile, guest: Option<&Profile>, grid_x: i32, grid_y: i32) -> CastAssignmentCreate {
        CastAssignmentCreate {
            cast_id: cast.id,
            guest_id: guest.map(|g| g.id),
            status: None,
            grid_x,
            grid_y,
            start_time: None,
            end_time: None,
        }
    }

    #[tokio::test]
    async fn test_create_checks_roles_and_duplicates() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let cast = profile(&pool, "Mio", ProfileRole::Cast).await;
        let staff = profile(&pool, "Ken", ProfileRole::Staff).await;
        let guest = profile(&pool, "Tanaka", ProfileRole::Guest).await;

        let err = create(&pool, STORE, s.id, waiting(&staff, None, 0, 0)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ProfileNotCast, _)));

        let err = create(&pool, STORE, s.id, waiting(&cast, Some(&staff), 0, 0)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ProfileNotGuest, _)));

        let a = create(&pool, STORE, s.id, waiting(&cast, Some(&guest), 1, 0)).await.unwrap();
        assert_eq!(a.status, CastStatus::Waiting);
        assert!(a.start_time.is_none());

        let err = create(&pool, STORE, s.id, waiting(&cast, None, 0, 0)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::CastAlreadyAssigned, _)));
    }

    #[tokio::test]
    async fn test_serving_gets_rotation_slot() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let cast = profile(&pool, "Mio", ProfileRole::Cast).await;

        let mut data = waiting(&cast, None, 0, 0);
        data.status = Some(CastStatus::Serving);
        let a = create(&pool, STORE, s.id, data).await.unwrap();
        let start = a.start_time.unwrap();
        // default rotation is 20 minutes
        assert_eq!(a.end_time, Some(start + 20 * 60_000));
    }

    #[tokio::test]
    async fn test_promotion_to_serving_gets_rotation_slot() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let cast = profile(&pool, "Mio", ProfileRole::Cast).await;
        let other = profile(&pool, "Rin", ProfileRole::Cast).await;

        let a = create(&pool, STORE, s.id, waiting(&cast, None, 0, 0)).await.unwrap();
        assert!(a.end_time.is_none());
        let promoted = update(
            &pool,
            STORE,
            a.id,
            CastAssignmentUpdate { status: Some(CastStatus::Serving), ..Default::default() },
        )
        .await
        .unwrap();
        let start = promoted.start_time.unwrap();
        assert_eq!(promoted.end_time, Some(start + 20 * 60_000));

        // an explicit end wins over the slot length
        let b = create(&pool, STORE, s.id, waiting(&other, None, 1, 0)).await.unwrap();
        let promoted = update(
            &pool,
            STORE,
            b.id,
            CastAssignmentUpdate {
                status: Some(CastStatus::Serving),
                start_time: Some(1_000),
                end_time: Some(5_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(promoted.start_time, Some(1_000));
        assert_eq!(promoted.end_time, Some(5_000));
    }

    #[tokio::test]
    async fn test_guest_entry_is_self_referential() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let guest = profile(&pool, "Sato", ProfileRole::Guest).await;
        let cast = profile(&pool, "Mio", ProfileRole::Cast).await;

        let entry = create_guest_entry(
            &pool,
            STORE,
            s.id,
            GuestEntryCreate { guest_id: guest.id, grid_x: 0, grid_y: 0 },
        )
        .await
        .unwrap();
        assert!(entry.is_guest_entry());
        assert_eq!(entry.status, CastStatus::Serving);

        let err = create_guest_entry(
            &pool,
            STORE,
            s.id,
            GuestEntryCreate { guest_id: cast.id, grid_x: 1, grid_y: 0 },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ProfileNotGuest, _)));
    }

    #[tokio::test]
    async fn test_ended_is_terminal() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let cast = profile(&pool, "Mio", ProfileRole::Cast).await;
        let a = create(&pool, STORE, s.id, waiting(&cast, None, 0, 0)).await.unwrap();

        let ended = end(&pool, STORE, a.id).await.unwrap();
        assert_eq!(ended.status, CastStatus::Ended);
        assert!(ended.end_time.is_some());

        let err = update(
            &pool,
            STORE,
            a.id,
            CastAssignmentUpdate { status: Some(CastStatus::Serving), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::AssignmentEnded, _)));

        let err = move_position(&pool, STORE, a.id, CastPosition { grid_x: 3, grid_y: 3 })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::AssignmentEnded, _)));

        // the cast can be seated again once the old row ended
        create(&pool, STORE, s.id, waiting(&cast, None, 0, 0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_nomination_and_position() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let cast = profile(&pool, "Mio", ProfileRole::Cast).await;
        let a = create(&pool, STORE, s.id, waiting(&cast, None, 0, 0)).await.unwrap();

        let a = update(
            &pool,
            STORE,
            a.id,
            CastAssignmentUpdate { status: Some(CastStatus::Shimei), ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(a.status, CastStatus::Shimei);

        let a = move_position(&pool, STORE, a.id, CastPosition { grid_x: 2, grid_y: 1 })
            .await
            .unwrap();
        assert_eq!((a.grid_x, a.grid_y), (2, 1));

        assert!(delete(&pool, STORE, a.id).await.unwrap());
        assert!(matches!(delete(&pool, STORE, a.id).await, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rotate_promotes_next_waiting_for_guest() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let guest = profile(&pool, "Tanaka", ProfileRole::Guest).await;
        let other_guest = profile(&pool, "Suzuki", ProfileRole::Guest).await;
        let rin = profile(&pool, "Rin", ProfileRole::Cast).await;
        let mio = profile(&pool, "Mio", ProfileRole::Cast).await;
        let yui = profile(&pool, "Yui", ProfileRole::Cast).await;
        let aoi = profile(&pool, "Aoi", ProfileRole::Cast).await;

        let now = shared::util::now_millis();
        let mut serving = waiting(&rin, Some(&guest), 0, 0);
        serving.status = Some(CastStatus::Serving);
        serving.start_time = Some(now - 1_200_000);
        serving.end_time = Some(now - 1_000);
        let serving = create(&pool, STORE, s.id, serving).await.unwrap();

        // grid row decides before column and id
        let later = create(&pool, STORE, s.id, waiting(&mio, Some(&guest), 0, 2)).await.unwrap();
        let next = create(&pool, STORE, s.id, waiting(&yui, Some(&guest), 5, 1)).await.unwrap();
        create(&pool, STORE, s.id, waiting(&aoi, Some(&other_guest), 0, 0)).await.unwrap();

        let expired = find_expired_serving(&pool, now).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, serving.id);

        let result = rotate(&pool, STORE, serving.id, now).await.unwrap();
        assert!(result.rotated);
        assert_eq!(result.ended.unwrap().status, CastStatus::Ended);
        let promoted = result.promoted.unwrap();
        assert_eq!(promoted.id, next.id);
        assert_eq!(promoted.status, CastStatus::Serving);
        assert_eq!(promoted.start_time, Some(now));
        assert_eq!(promoted.end_time, Some(now + 20 * 60_000));

        // second overlapping rotation is a no-op
        let again = rotate(&pool, STORE, serving.id, now).await.unwrap();
        assert!(!again.rotated);
        let still_waiting = find_by_id(&pool, STORE, later.id).await.unwrap().unwrap();
        assert_eq!(still_waiting.status, CastStatus::Waiting);
    }

    #[tokio::test]
    async fn test_rotate_before_end_is_noop() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let rin = profile(&pool, "Rin", ProfileRole::Cast).await;

        let mut data = waiting(&rin, None, 0, 0);
        data.status = Some(CastStatus::Serving);
        let a = create(&pool, STORE, s.id, data).await.unwrap();

        let result = rotate(&pool, STORE, a.id, shared::util::now_millis()).await.unwrap();
        assert!(!result.rotated);
        let a = find_by_id(&pool, STORE, a.id).await.unwrap().unwrap();
        assert_eq!(a.status, CastStatus::Serving);
    }

    #[tokio::test]
    async fn test_closed_sessions_are_not_polled() {
        let pool = pool().await;
        let s = session(&pool, table(&pool, "A").await.id).await;
        let rin = profile(&pool, "Rin", ProfileRole::Cast).await;
        let now = shared::util::now_millis();
        let mut data = waiting(&rin, None, 0, 0);
        data.status = Some(CastStatus::Serving);
        data.end_time = Some(now - 1);
        create(&pool, STORE, s.id, data).await.unwrap();

        assert_eq!(find_expired_serving(&pool, now).await.unwrap().len(), 1);
        table_session::close(&pool, STORE, s.id).await.unwrap();
        assert!(find_expired_serving(&pool, now).await.unwrap().is_empty());
    }
}
