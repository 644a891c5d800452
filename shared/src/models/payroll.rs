//! Payroll calculation DTOs

use serde::{Deserialize, Serialize};

use super::BackCategory;

/// One attendance interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkInterval {
    pub clock_in: i64,
    pub clock_out: i64,
    #[serde(default)]
    pub break_minutes: i64,
    /// Minutes spent at tables; falls back to the whole interval when absent
    pub serving_minutes: Option<i64>,
}

/// A sale or nomination that may earn a back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackEvent {
    pub category: BackCategory,
    pub occurred_at: i64,
    /// Billed total of the sale
    #[serde(default)]
    pub total: i64,
    /// Pre-service, pre-tax subtotal of the sale
    #[serde(default)]
    pub subtotal: i64,
}

/// Everything the engine needs for one profile and one pay period
///
/// `events` may reach back before `period_start` so tier counters can
/// pick up where the reset window began.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollInput {
    pub period_start: i64,
    pub period_end: i64,
    #[serde(default)]
    pub attendances: Vec<WorkInterval>,
    #[serde(default)]
    pub events: Vec<BackEvent>,
}

/// Request body of `POST /api/payroll/calculate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRequest {
    pub profile_id: i64,
    #[serde(flatten)]
    pub input: PayrollInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackLine {
    pub category: BackCategory,
    pub count: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    pub name: String,
    pub amount: i64,
}

/// Result of a payroll calculation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    pub hourly_pay: i64,
    pub worked_minutes: i64,
    pub paid_minutes: i64,
    pub backs: Vec<BackLine>,
    pub back_total: i64,
    pub gross: i64,
    pub deductions: Vec<DeductionLine>,
    pub deduction_total: i64,
    pub net: i64,
}
