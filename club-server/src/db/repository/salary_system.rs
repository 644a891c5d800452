//! Salary System Repository
//!
//! Nested settings are stored as JSON text columns and decoded through
//! [`SalarySystemRow`].

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{
    BackSet, BackSettings, Deduction, HourlySettings, SalarySystem, SalarySystemInput,
    SalaryTarget, SharedCountType,
};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, store_id, name, target, hourly_settings, store_back, jounai_back, shimei_back, douhan_back, shared_count_type, deductions, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct SalarySystemRow {
    id: i64,
    store_id: i64,
    name: String,
    target: SalaryTarget,
    hourly_settings: Option<String>,
    store_back: Option<String>,
    jounai_back: Option<String>,
    shimei_back: Option<String>,
    douhan_back: Option<String>,
    shared_count_type: SharedCountType,
    deductions: String,
    created_at: i64,
    updated_at: i64,
}

fn decode_back(column: Option<String>) -> RepoResult<Option<BackSettings>> {
    column.map(|json| serde_json::from_str(&json)).transpose().map_err(Into::into)
}

impl TryFrom<SalarySystemRow> for SalarySystem {
    type Error = RepoError;

    fn try_from(row: SalarySystemRow) -> Result<Self, Self::Error> {
        let hourly: Option<HourlySettings> = row
            .hourly_settings
            .map(|json| serde_json::from_str(&json))
            .transpose()?;
        let deductions: Vec<Deduction> = serde_json::from_str(&row.deductions)?;

        Ok(SalarySystem {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
            target: row.target,
            hourly,
            backs: BackSet {
                store: decode_back(row.store_back)?,
                jounai: decode_back(row.jounai_back)?,
                shimei: decode_back(row.shimei_back)?,
                douhan: decode_back(row.douhan_back)?,
            },
            shared_count_type: row.shared_count_type,
            deductions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// JSON column values for one input, in column order
struct Encoded {
    hourly: Option<String>,
    backs: [Option<String>; 4],
    deductions: String,
}

fn encode(input: &SalarySystemInput) -> RepoResult<Encoded> {
    let back = |b: &Option<BackSettings>| b.as_ref().map(serde_json::to_string).transpose();
    Ok(Encoded {
        hourly: input.hourly.as_ref().map(serde_json::to_string).transpose()?,
        backs: [
            back(&input.backs.store)?,
            back(&input.backs.jounai)?,
            back(&input.backs.shimei)?,
            back(&input.backs.douhan)?,
        ],
        deductions: serde_json::to_string(&input.deductions)?,
    })
}

pub async fn find_all(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<SalarySystem>> {
    let rows = sqlx::query_as::<_, SalarySystemRow>(&format!(
        "SELECT {COLUMNS} FROM salary_systems WHERE store_id = ? ORDER BY target, name, id"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(SalarySystem::try_from).collect()
}

pub async fn find_by_id(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
) -> RepoResult<Option<SalarySystem>> {
    let row = sqlx::query_as::<_, SalarySystemRow>(&format!(
        "SELECT {COLUMNS} FROM salary_systems WHERE id = ? AND store_id = ?"
    ))
    .bind(id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    row.map(SalarySystem::try_from).transpose()
}

fn not_found(id: i64) -> RepoError {
    RepoError::Business(
        ErrorCode::SalarySystemNotFound,
        format!("Salary system {id} not found"),
    )
}

async fn require(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<SalarySystem> {
    find_by_id(pool, store_id, id).await?.ok_or_else(|| not_found(id))
}

/// Create from an already validated input
pub async fn create(
    pool: &SqlitePool,
    store_id: i64,
    input: SalarySystemInput,
) -> RepoResult<SalarySystem> {
    let encoded = encode(&input)?;
    let now = shared::util::now_millis();
    let [store_back, jounai_back, shimei_back, douhan_back] = encoded.backs;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO salary_systems (store_id, name, target, hourly_settings, store_back, jounai_back, shimei_back, douhan_back, shared_count_type, deductions, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11) RETURNING id",
    )
    .bind(store_id)
    .bind(&input.name)
    .bind(input.target)
    .bind(encoded.hourly)
    .bind(store_back)
    .bind(jounai_back)
    .bind(shimei_back)
    .bind(douhan_back)
    .bind(input.shared_count_type)
    .bind(encoded.deductions)
    .bind(now)
    .fetch_one(pool)
    .await?;

    require(pool, store_id, id).await
}

async fn assigned_count(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM profile_salary_systems WHERE salary_system_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Full replace of name, target and every settings block
///
/// The target cannot change while profiles are assigned to the system.
pub async fn update(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    input: SalarySystemInput,
) -> RepoResult<SalarySystem> {
    let current = require(pool, store_id, id).await?;
    if current.target != input.target && assigned_count(pool, id).await? > 0 {
        return Err(RepoError::Business(
            ErrorCode::SalarySystemInUse,
            format!("Salary system '{}' is assigned; its target cannot change", current.name),
        ));
    }

    let encoded = encode(&input)?;
    let [store_back, jounai_back, shimei_back, douhan_back] = encoded.backs;
    sqlx::query(
        "UPDATE salary_systems SET name = ?1, target = ?2, hourly_settings = ?3, store_back = ?4, jounai_back = ?5, shimei_back = ?6, douhan_back = ?7, shared_count_type = ?8, deductions = ?9, updated_at = ?10 WHERE id = ?11 AND store_id = ?12",
    )
    .bind(&input.name)
    .bind(input.target)
    .bind(encoded.hourly)
    .bind(store_back)
    .bind(jounai_back)
    .bind(shimei_back)
    .bind(douhan_back)
    .bind(input.shared_count_type)
    .bind(encoded.deductions)
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(store_id)
    .execute(pool)
    .await?;

    require(pool, store_id, id).await
}

pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<bool> {
    let current = require(pool, store_id, id).await?;
    let assigned = assigned_count(pool, id).await?;
    if assigned > 0 {
        return Err(RepoError::Business(
            ErrorCode::SalarySystemInUse,
            format!("Salary system '{}' is assigned to {assigned} profile(s)", current.name),
        ));
    }

    sqlx::query("DELETE FROM salary_systems WHERE id = ? AND store_id = ?")
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;
    Ok(true)
}

/// Rewrite deduction `order` as 0..n following `ids`
///
/// Deductions not named in `ids` keep their relative order after the named
/// ones.
pub async fn reorder_deductions(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    ids: &[String],
) -> RepoResult<SalarySystem> {
    let current = require(pool, store_id, id).await?;
    let mut remaining = current.deductions;
    remaining.sort_by_key(|d| d.order);

    let mut ordered = Vec::with_capacity(remaining.len());
    for deduction_id in ids {
        let pos = remaining.iter().position(|d| &d.id == deduction_id).ok_or_else(|| {
            RepoError::Business(
                ErrorCode::DeductionNotFound,
                format!("Deduction {deduction_id} not found"),
            )
        })?;
        ordered.push(remaining.remove(pos));
    }
    ordered.extend(remaining);
    for (i, deduction) in ordered.iter_mut().enumerate() {
        deduction.order = i as i32;
    }

    sqlx::query("UPDATE salary_systems SET deductions = ?, updated_at = ? WHERE id = ? AND store_id = ?")
        .bind(serde_json::to_string(&ordered)?)
        .bind(shared::util::now_millis())
        .bind(id)
        .bind(store_id)
        .execute(pool)
        .await?;

    require(pool, store_id, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{profile, test_support::{STORE, pool}};
    use shared::models::{
        BackCalculation, DeductionType, PayType, ProfileRole, RoundingMethod,
    };

    fn deduction(id: &str, order: i32) -> Deduction {
        Deduction {
            id: id.into(),
            name: format!("Deduction {id}"),
            deduction_type: DeductionType::Fixed,
            percentage: 0.0,
            amount: 1000,
            order,
        }
    }

    fn input() -> SalarySystemInput {
        SalarySystemInput {
            name: "Standard cast".into(),
            target: SalaryTarget::Cast,
            hourly: Some(HourlySettings {
                pay_type: PayType::Hourly,
                amount: 3000,
                time_unit_minutes: 15,
                time_rounding: RoundingMethod::Down,
                only_serving: false,
                include_break: false,
            }),
            backs: BackSet {
                shimei: Some(BackSettings {
                    calculation_type: BackCalculation::Fixed,
                    percentage: 0.0,
                    fixed_amount: 2000,
                    rounding_method: RoundingMethod::Round,
                    rounding_unit: 1,
                    variable: None,
                }),
                ..Default::default()
            },
            shared_count_type: SharedCountType::JounaiShimei,
            deductions: vec![deduction("a", 0), deduction("b", 1), deduction("c", 2)],
        }
    }

    #[tokio::test]
    async fn test_json_columns_round_trip() {
        let pool = pool().await;
        let created = create(&pool, STORE, input()).await.unwrap();
        assert_eq!(created.hourly.as_ref().unwrap().amount, 3000);
        assert!(created.backs.store.is_none());
        assert_eq!(created.backs.shimei.as_ref().unwrap().fixed_amount, 2000);
        assert_eq!(created.shared_count_type, SharedCountType::JounaiShimei);
        assert_eq!(find_all(&pool, STORE).await.unwrap().len(), 1);

        let mut replacement = input();
        replacement.hourly = None;
        replacement.backs = BackSet::default();
        let updated = update(&pool, STORE, created.id, replacement).await.unwrap();
        assert!(updated.hourly.is_none());
        assert!(updated.backs.shimei.is_none());
    }

    #[tokio::test]
    async fn test_reorder_deductions() {
        let pool = pool().await;
        let created = create(&pool, STORE, input()).await.unwrap();

        let reordered = reorder_deductions(&pool, STORE, created.id, &["c".into(), "a".into()])
            .await
            .unwrap();
        let order: Vec<_> = reordered.deductions.iter().map(|d| (d.id.as_str(), d.order)).collect();
        assert_eq!(order, vec![("c", 0), ("a", 1), ("b", 2)]);

        let err = reorder_deductions(&pool, STORE, created.id, &["zzz".into()]).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::DeductionNotFound, _)));
    }

    #[tokio::test]
    async fn test_assigned_system_is_protected() {
        let pool = pool().await;
        let system = create(&pool, STORE, input()).await.unwrap();
        let cast = crate::db::repository::test_support::profile(&pool, "Mio", ProfileRole::Cast).await;
        profile::set_salary_systems(&pool, STORE, cast.id, &[system.id]).await.unwrap();

        let err = delete(&pool, STORE, system.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::SalarySystemInUse, _)));

        let mut staff = input();
        staff.target = SalaryTarget::Staff;
        let err = update(&pool, STORE, system.id, staff).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::SalarySystemInUse, _)));

        profile::set_salary_systems(&pool, STORE, cast.id, &[]).await.unwrap();
        assert!(delete(&pool, STORE, system.id).await.unwrap());
        assert!(find_by_id(&pool, STORE, system.id).await.unwrap().is_none());
    }
}
