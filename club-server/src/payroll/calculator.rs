//! Payroll calculator
//!
//! Pure function of a salary system and one period's attendance and sales.
//!
//! ```text
//! gross = hourly pay + Σ backs
//! net   = gross - deductions (applied in order to the running remainder, never below 0)
//! ```

use std::collections::BTreeMap;

use chrono::NaiveTime;
use chrono_tz::Tz;
use rust_decimal::prelude::*;
use shared::models::{
    BackCalculation, BackCategory, BackEvent, BackLine, BackSettings, DeductionLine,
    DeductionType, HourlySettings, PayType, PayrollBreakdown, PayrollInput, SalarySystem,
    SharedCountType, TierBasis, WorkInterval,
};

use super::period::window_start;
use super::rounding::{apply_rounding, percent_of, round_minutes, to_yen};
use super::tier::select_tier;
use crate::utils::time::business_date;

/// Run the full calculation for one profile and one period
pub fn calculate(
    system: &SalarySystem,
    input: &PayrollInput,
    tz: Tz,
    day_switch: NaiveTime,
) -> PayrollBreakdown {
    let attendances: Vec<&WorkInterval> = input
        .attendances
        .iter()
        .filter(|a| a.clock_in >= input.period_start && a.clock_in < input.period_end)
        .collect();

    let worked_minutes: i64 = attendances.iter().map(|a| interval_minutes(a)).sum();
    let (hourly_pay, paid_minutes) = match &system.hourly {
        Some(hourly) => hourly_pay(hourly, &attendances),
        None => (0, 0),
    };

    let backs = calculate_backs(system, input, tz, day_switch);
    let back_total = backs.iter().fold(0i64, |sum, b| sum.saturating_add(b.amount));
    let gross = hourly_pay.saturating_add(back_total);

    let (deductions, deduction_total) = apply_deductions(system, gross);

    PayrollBreakdown {
        hourly_pay,
        worked_minutes,
        paid_minutes,
        backs,
        back_total,
        gross,
        deductions,
        deduction_total,
        net: gross - deduction_total,
    }
}

fn interval_minutes(interval: &WorkInterval) -> i64 {
    ((interval.clock_out - interval.clock_in) / 60_000).max(0)
}

/// Paid minutes are rounded per attendance, then summed
fn hourly_pay(settings: &HourlySettings, attendances: &[&WorkInterval]) -> (i64, i64) {
    let unit = i64::from(settings.time_unit_minutes);
    let paid_minutes: i64 = attendances
        .iter()
        .map(|a| {
            let minutes = if settings.only_serving {
                a.serving_minutes.unwrap_or_else(|| interval_minutes(a))
            } else if settings.include_break {
                interval_minutes(a)
            } else {
                interval_minutes(a) - a.break_minutes
            };
            round_minutes(minutes.max(0), unit, settings.time_rounding)
        })
        .sum();

    let pay = match settings.pay_type {
        PayType::Monthly => settings.amount,
        PayType::Hourly => {
            let pay = Decimal::from(paid_minutes).saturating_mul(Decimal::from(settings.amount))
                / Decimal::from(60);
            to_yen(pay.floor())
        }
    };
    (pay, paid_minutes)
}

/// Counter pool an event's occurrences are added to
fn pool_key(shared: SharedCountType, category: BackCategory) -> BackCategory {
    match (shared, category) {
        (SharedCountType::All, _) => BackCategory::Store,
        (SharedCountType::JounaiShimei, BackCategory::Shimei) => BackCategory::Jounai,
        _ => category,
    }
}

/// Event already folded into the counters
struct Counted {
    pool: BackCategory,
    date: chrono::NaiveDate,
    total: i64,
}

fn calculate_backs(
    system: &SalarySystem,
    input: &PayrollInput,
    tz: Tz,
    day_switch: NaiveTime,
) -> Vec<BackLine> {
    let mut events: Vec<&BackEvent> = input
        .events
        .iter()
        .filter(|e| e.occurred_at < input.period_end)
        .collect();
    events.sort_by_key(|e| e.occurred_at);

    let mut history: Vec<Counted> = Vec::with_capacity(events.len());
    let mut lines: BTreeMap<BackCategory, BackLine> = BTreeMap::new();

    for event in events {
        let pool = pool_key(system.shared_count_type, event.category);
        let date = business_date(event.occurred_at, day_switch, tz);
        history.push(Counted {
            pool,
            date,
            total: event.total,
        });

        let Some(settings) = system.backs.get(event.category) else {
            continue;
        };
        if event.occurred_at < input.period_start {
            continue;
        }

        let amount = back_amount(settings, event, |period| {
            let from = window_start(date, period);
            history
                .iter()
                .filter(|c| c.pool == pool && c.date >= from && c.date <= date)
                .fold((0, 0), |(count, total), c| (count + 1, total + c.total))
        });

        let line = lines.entry(event.category).or_insert(BackLine {
            category: event.category,
            count: 0,
            amount: 0,
        });
        line.count += 1;
        line.amount = line.amount.saturating_add(amount);
    }

    lines.into_values().collect()
}

/// Back earned by one event
///
/// `cumulative` returns `(count, amount)` of the event's pool within the
/// reset window, this event included.
fn back_amount(
    settings: &BackSettings,
    event: &BackEvent,
    cumulative: impl FnOnce(shared::models::ResetPeriod) -> (i64, i64),
) -> i64 {
    let mut percentage = settings.percentage;
    let mut fixed = settings.fixed_amount;

    if let Some(variable) = &settings.variable {
        let (count, amount) = cumulative(variable.reset_period);
        let value = match variable.basis {
            TierBasis::Count => count,
            TierBasis::Amount => amount,
        };
        if let Some(tier) = select_tier(&variable.tiers, variable.basis, value) {
            percentage = tier.percentage.unwrap_or(percentage);
            fixed = tier.fixed_amount.unwrap_or(fixed);
        }
    }

    let raw = match settings.calculation_type {
        BackCalculation::TotalPercent => percent_of(Decimal::from(event.total), percentage),
        BackCalculation::SubtotalPercent => percent_of(Decimal::from(event.subtotal), percentage),
        BackCalculation::Fixed => Decimal::from(fixed),
    };
    apply_rounding(raw, settings.rounding_method, settings.rounding_unit)
}

/// Deductions in `order`, each taken from what is left
fn apply_deductions(system: &SalarySystem, gross: i64) -> (Vec<DeductionLine>, i64) {
    let mut ordered: Vec<_> = system.deductions.iter().collect();
    ordered.sort_by_key(|d| d.order);

    let mut remainder = gross.max(0);
    let mut lines = Vec::with_capacity(ordered.len());
    for deduction in ordered {
        let wanted = match deduction.deduction_type {
            DeductionType::Percentage => {
                to_yen(percent_of(Decimal::from(remainder), deduction.percentage).floor())
            }
            DeductionType::Fixed => deduction.amount,
        };
        let amount = wanted.clamp(0, remainder);
        remainder -= amount;
        lines.push(DeductionLine {
            name: deduction.name.clone(),
            amount,
        });
    }

    let total = lines.iter().map(|l| l.amount).sum();
    (lines, total)
}
