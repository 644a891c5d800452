//! Payroll Handlers

use axum::{Extension, Json, extract::State};
use shared::error::ErrorCode;
use shared::models::{PayrollBreakdown, PayrollInput, PayrollRequest, SalarySystem};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{profile, salary_system, settings};
use crate::payroll;
use crate::utils::time::parse_day_switch;
use crate::utils::validation::validate_amount;
use crate::utils::{AppError, AppResult};

/// Longest period a single calculation may cover
const MAX_PERIOD_MS: i64 = 366 * 24 * 60 * 60 * 1000;

/// Longest single attendance (two business days)
const MAX_ATTENDANCE_MS: i64 = 48 * 60 * 60 * 1000;

fn validate_period(input: &PayrollInput) -> AppResult<()> {
    if input.period_start < 0 || input.period_end <= input.period_start {
        return Err(AppError::validation("period_end must be after period_start"));
    }
    if input.period_end - input.period_start > MAX_PERIOD_MS {
        return Err(AppError::validation("period must not exceed 366 days"));
    }
    for a in &input.attendances {
        if a.clock_in < 0 || a.clock_out < a.clock_in || a.break_minutes < 0 {
            return Err(AppError::validation(
                "attendance clock_out must not precede clock_in and breaks must not be negative",
            ));
        }
        let span = a.clock_out - a.clock_in;
        if span > MAX_ATTENDANCE_MS || a.break_minutes.saturating_mul(60_000) > span {
            return Err(AppError::validation(
                "attendance must not exceed 48 hours and breaks must fit inside it",
            ));
        }
        if a.serving_minutes.is_some_and(|m| m < 0 || m.saturating_mul(60_000) > span) {
            return Err(AppError::validation("serving_minutes must fit inside the attendance"));
        }
    }
    for e in &input.events {
        validate_amount(e.total, "event.total")?;
        validate_amount(e.subtotal, "event.subtotal")?;
    }
    Ok(())
}

/// Validate the period and run the calculator with the store's day switch
pub(crate) async fn run_calculation(
    state: &ServerState,
    store_id: i64,
    system: &SalarySystem,
    input: &PayrollInput,
) -> AppResult<PayrollBreakdown> {
    validate_period(input)?;
    let store_settings = settings::get_settings(&state.pool, store_id).await?;
    let day_switch = parse_day_switch(&store_settings.day_switch_time);
    Ok(payroll::calculate(system, input, state.config.timezone, day_switch))
}

/// POST /api/payroll/calculate
pub async fn calculate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<PayrollRequest>,
) -> AppResult<Json<PayrollBreakdown>> {
    let store_id = current_user.store_id;
    let target_profile = profile::find_by_id(&state.pool, store_id, req.profile_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Profile {}", req.profile_id)))?;

    let no_system = || {
        AppError::with_message(
            ErrorCode::NoSalarySystemAssigned,
            format!("Profile {} has no salary system assigned", target_profile.id),
        )
    };
    let target = target_profile.role.salary_target().ok_or_else(no_system)?;
    let link = profile::get_salary_systems(&state.pool, store_id, target_profile.id)
        .await?
        .into_iter()
        .find(|l| l.target == target)
        .ok_or_else(no_system)?;
    let system = salary_system::find_by_id(&state.pool, store_id, link.salary_system_id)
        .await?
        .ok_or_else(no_system)?;

    let breakdown = run_calculation(&state, store_id, &system, &req.input).await?;
    tracing::info!(
        user_id = current_user.id,
        profile_id = target_profile.id,
        salary_system_id = system.id,
        gross = breakdown.gross,
        net = breakdown.net,
        "Payroll calculated"
    );
    Ok(Json(breakdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{BackCategory, BackEvent, WorkInterval};

    const HOUR: i64 = 60 * 60 * 1000;

    fn period(attendances: Vec<WorkInterval>, events: Vec<BackEvent>) -> PayrollInput {
        PayrollInput {
            period_start: 0,
            period_end: 30 * 24 * HOUR,
            attendances,
            events,
        }
    }

    fn shift(clock_in: i64, clock_out: i64, break_minutes: i64) -> WorkInterval {
        WorkInterval {
            clock_in,
            clock_out,
            break_minutes,
            serving_minutes: None,
        }
    }

    #[test]
    fn test_period_bounds() {
        assert!(validate_period(&period(vec![shift(HOUR, 9 * HOUR, 60)], vec![])).is_ok());

        let mut inp = period(vec![], vec![]);
        inp.period_end = inp.period_start;
        assert!(validate_period(&inp).is_err());

        inp.period_start = i64::MIN;
        inp.period_end = i64::MAX;
        assert!(validate_period(&inp).is_err());

        inp.period_start = 0;
        inp.period_end = MAX_PERIOD_MS + 1;
        assert!(validate_period(&inp).is_err());
    }

    #[test]
    fn test_attendance_bounds() {
        for bad in [
            shift(9 * HOUR, HOUR, 0),
            shift(0, 49 * HOUR, 0),
            shift(0, HOUR, 61),
            shift(0, HOUR, i64::MAX),
            shift(i64::MIN, 0, 0),
        ] {
            assert!(validate_period(&period(vec![bad], vec![])).is_err());
        }

        let mut serving = shift(0, HOUR, 0);
        serving.serving_minutes = Some(90);
        assert!(validate_period(&period(vec![serving], vec![])).is_err());
    }

    #[test]
    fn test_event_amounts_capped() {
        let event = |total| BackEvent {
            category: BackCategory::Shimei,
            occurred_at: HOUR,
            total,
            subtotal: 0,
        };
        assert!(validate_period(&period(vec![], vec![event(50_000)])).is_ok());
        assert!(validate_period(&period(vec![], vec![event(i64::MAX)])).is_err());
        assert!(validate_period(&period(vec![], vec![event(-1)])).is_err());
    }
}
