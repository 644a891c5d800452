//! Table Session Repository
//!
//! A session is the stay of one party at one table. At most one session per
//! table is `active` (partial unique index); closing freezes the bill.

use chrono_tz::Tz;
use super::{RepoError, RepoResult, cast_assignment, order, settings};
use shared::error::ErrorCode;
use shared::models::{
    SessionDetail, SessionStatus, TableSession, TableSessionCreate, TableSessionUpdate,
};
use sqlx::SqlitePool;

use crate::billing;
use crate::utils::time::parse_day_switch;

const COLUMNS: &str = "id, store_id, table_id, guest_count, status, start_time, end_time, note, subtotal, total, updated_at";

pub async fn find_active(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<TableSession>> {
    let sessions = sqlx::query_as::<_, TableSession>(&format!(
        "SELECT {COLUMNS} FROM table_sessions WHERE store_id = ? AND status = 'active' ORDER BY start_time"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(sessions)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
) -> RepoResult<Option<TableSession>> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "SELECT {COLUMNS} FROM table_sessions WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

/// Load a session that still accepts changes
pub async fn require_active(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<TableSession> {
    let session = find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Session {id}")))?;
    if session.status == SessionStatus::Closed {
        return Err(RepoError::Business(
            ErrorCode::SessionClosed,
            format!("Session {id} is closed"),
        ));
    }
    Ok(session)
}

/// Active table with no open session, or the matching error
async fn require_free_table(pool: &SqlitePool, store_id: i64, table_id: i64) -> RepoResult<()> {
    match super::table::find_by_id(pool, store_id, table_id).await? {
        Some(t) if t.is_active => {}
        _ => return Err(RepoError::NotFound(format!("Table {table_id}"))),
    }

    let occupied: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM table_sessions WHERE table_id = ? AND status = 'active'",
    )
    .bind(table_id)
    .fetch_one(pool)
    .await?;
    if occupied > 0 {
        return Err(table_occupied(table_id));
    }
    Ok(())
}

fn table_occupied(table_id: i64) -> RepoError {
    RepoError::Business(
        ErrorCode::TableOccupied,
        format!("Table {table_id} already has an active session"),
    )
}

/// Map a unique-index hit (two opens racing for one table) to TableOccupied
fn occupied_on_duplicate(table_id: i64) -> impl FnOnce(sqlx::Error) -> RepoError {
    move |e| match RepoError::from(e) {
        RepoError::Duplicate(_) => table_occupied(table_id),
        other => other,
    }
}

pub async fn open(
    pool: &SqlitePool,
    store_id: i64,
    data: TableSessionCreate,
) -> RepoResult<TableSession> {
    require_free_table(pool, store_id, data.table_id).await?;

    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO table_sessions (store_id, table_id, guest_count, status, start_time, note, updated_at) VALUES (?, ?, ?, 'active', ?, ?, ?) RETURNING id",
    )
    .bind(store_id)
    .bind(data.table_id)
    .bind(data.guest_count)
    .bind(now)
    .bind(&data.note)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(occupied_on_duplicate(data.table_id))?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to open session".into()))
}

pub async fn update(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    data: TableSessionUpdate,
) -> RepoResult<TableSession> {
    require_active(pool, store_id, id).await?;

    sqlx::query(
        "UPDATE table_sessions SET guest_count = COALESCE(?1, guest_count), note = COALESCE(?2, note), updated_at = ?3 WHERE id = ?4 AND store_id = ?5",
    )
    .bind(data.guest_count)
    .bind(data.note)
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(store_id)
    .execute(pool)
    .await?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Session {id}")))
}

/// Move an active session to another free table
pub async fn move_to(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    table_id: i64,
) -> RepoResult<TableSession> {
    let session = require_active(pool, store_id, id).await?;
    if session.table_id == table_id {
        return Ok(session);
    }
    require_free_table(pool, store_id, table_id).await?;

    sqlx::query("UPDATE table_sessions SET table_id = ?, updated_at = ? WHERE id = ? AND store_id = ?")
        .bind(table_id)
        .bind(shared::util::now_millis())
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await
        .map_err(occupied_on_duplicate(table_id))?;

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Session {id}")))
}

/// Close a session
///
/// One transaction ends every assignment that is still running, freezes
/// subtotal and total, and marks the session closed.
pub async fn close(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<TableSession> {
    // settings are read on the pool before the transaction takes the connection
    let settings = settings::get_settings(pool, store_id).await?;

    let mut tx = pool.begin().await?;
    let now = shared::util::now_millis();

    let status: Option<SessionStatus> =
        sqlx::query_scalar("SELECT status FROM table_sessions WHERE id = ? AND store_id = ?")
            .bind(id)
            .bind(store_id)
            .fetch_optional(&mut *tx)
            .await?;
    match status {
        None => return Err(RepoError::NotFound(format!("Session {id}"))),
        Some(SessionStatus::Closed) => {
            return Err(RepoError::Business(
                ErrorCode::SessionClosed,
                format!("Session {id} is already closed"),
            ));
        }
        Some(SessionStatus::Active) => {}
    }

    let ended = sqlx::query(
        "UPDATE cast_assignments SET status = 'ended', \
            end_time = CASE WHEN end_time IS NULL OR end_time > ?1 THEN ?1 ELSE end_time END, \
            updated_at = ?1 \
         WHERE table_session_id = ?2 AND status != 'ended'",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let subtotal: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM orders WHERE table_session_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    let bill = billing::compute_bill(subtotal, &settings);

    sqlx::query(
        "UPDATE table_sessions SET status = 'closed', end_time = ?1, subtotal = ?2, total = ?3, updated_at = ?1 WHERE id = ?4",
    )
    .bind(now)
    .bind(bill.subtotal)
    .bind(bill.total)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::debug!(session_id = id, ended_assignments = ended, total = bill.total, "Session closed");

    find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Session {id}")))
}

/// Session with sorted assignments, orders and the bill
///
/// Open sessions get a live bill from current settings; closed sessions
/// report the frozen subtotal and total.
pub async fn detail(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    tz: Tz,
) -> RepoResult<SessionDetail> {
    let session = find_by_id(pool, store_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Session {id}")))?;
    let settings = settings::get_settings(pool, store_id).await?;

    let mut assignments = cast_assignment::find_by_session(pool, store_id, id).await?;
    shared::time_utils::sort_casts_by_time(
        &mut assignments,
        parse_day_switch(&settings.day_switch_time),
        tz,
    );
    let orders = order::find_by_session(pool, store_id, id).await?;

    let mut bill = billing::compute_bill(billing::subtotal_of(&orders), &settings);
    if session.status == SessionStatus::Closed {
        bill.subtotal = session.subtotal;
        bill.total = session.total;
    }

    Ok(SessionDetail {
        session,
        assignments,
        orders,
        bill,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{STORE, pool, profile, session, table};
    use shared::models::{CastAssignmentCreate, CastStatus, OrderCreate, ProfileRole, StoreSettingsUpdate};

    #[tokio::test]
    async fn test_open_rejects_occupied_table() {
        let pool = pool().await;
        let t = table(&pool, "A1").await;
        let s = session(&pool, t.id).await;
        assert_eq!(s.status, SessionStatus::Active);

        let err = open(
            &pool,
            STORE,
            TableSessionCreate { table_id: t.id, guest_count: 1, note: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::TableOccupied, _)));

        let err = open(
            &pool,
            STORE,
            TableSessionCreate { table_id: 404, guest_count: 1, note: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_move_to_free_table_only() {
        let pool = pool().await;
        let a = table(&pool, "A").await;
        let b = table(&pool, "B").await;
        let c = table(&pool, "C").await;
        let s = session(&pool, a.id).await;
        session(&pool, c.id).await;

        let err = move_to(&pool, STORE, s.id, c.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::TableOccupied, _)));

        let moved = move_to(&pool, STORE, s.id, b.id).await.unwrap();
        assert_eq!(moved.table_id, b.id);
        // the old table is free again
        session(&pool, a.id).await;
    }

    #[tokio::test]
    async fn test_close_ends_assignments_and_freezes_bill() {
        let pool = pool().await;
        settings::update_settings(
            &pool,
            STORE,
            StoreSettingsUpdate {
                service_rate: Some(20.0),
                tax_rate: Some(10.0),
                slip_rounding_enabled: Some(true),
                slip_rounding_unit: Some(100),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let t = table(&pool, "VIP").await;
        let s = session(&pool, t.id).await;
        let cast = profile(&pool, "Rin", ProfileRole::Cast).await;
        let far_future = shared::util::now_millis() + 3_600_000;
        cast_assignment::create(
            &pool,
            STORE,
            s.id,
            CastAssignmentCreate {
                cast_id: cast.id,
                guest_id: None,
                status: Some(CastStatus::Serving),
                grid_x: 0,
                grid_y: 0,
                start_time: Some(shared::util::now_millis()),
                end_time: Some(far_future),
            },
        )
        .await
        .unwrap();
        order::create(
            &pool,
            STORE,
            s.id,
            OrderCreate {
                menu_id: None,
                item_name: Some("Champagne".into()),
                unit_price: Some(12_345),
                quantity: 1,
                cast_id: Some(cast.id),
                guest_id: None,
            },
        )
        .await
        .unwrap();

        let closed = close(&pool, STORE, s.id).await.unwrap();
        assert_eq!(closed.status, SessionStatus::Closed);
        assert_eq!(closed.subtotal, 12_345);
        // 12_345 × 1.2 × 1.1 = 16_295.4 → 16_300
        assert_eq!(closed.total, 16_300);
        assert!(closed.end_time.is_some());

        let assignments = cast_assignment::find_by_session(&pool, STORE, s.id).await.unwrap();
        assert!(assignments.iter().all(|a| a.status == CastStatus::Ended));
        assert!(assignments[0].end_time.unwrap() < far_future);

        let err = close(&pool, STORE, s.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::SessionClosed, _)));

        // table is free after close
        session(&pool, t.id).await;
    }

    #[tokio::test]
    async fn test_detail_reports_live_bill() {
        let pool = pool().await;
        let t = table(&pool, "B1").await;
        let s = session(&pool, t.id).await;
        order::create(
            &pool,
            STORE,
            s.id,
            OrderCreate {
                menu_id: None,
                item_name: Some("Set".into()),
                unit_price: Some(5_000),
                quantity: 2,
                cast_id: None,
                guest_id: None,
            },
        )
        .await
        .unwrap();

        let detail = detail(&pool, STORE, s.id, chrono_tz::UTC).await.unwrap();
        assert_eq!(detail.orders.len(), 1);
        assert_eq!(detail.bill.subtotal, 10_000);
        // default settings: no service, 10% tax
        assert_eq!(detail.bill.total, 11_000);
    }

    #[tokio::test]
    async fn test_other_store_session_is_not_found() {
        let pool = pool().await;
        let t = table(&pool, "C1").await;
        let s = session(&pool, t.id).await;
        assert!(find_by_id(&pool, 2, s.id).await.unwrap().is_none());
    }
}
