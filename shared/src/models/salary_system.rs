//! Salary System Model (給与体系)
//!
//! A salary system is a named ruleset scoped to a store. Its settings are
//! stored as JSON columns, so only [`SalarySystem`] itself crosses the
//! repository boundary; the nested settings types are plain serde values.

use serde::{Deserialize, Serialize};

use super::RoundingMethod;

/// Who a salary system pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SalaryTarget {
    Cast,
    Staff,
}

/// Hourly or monthly base pay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayType {
    #[default]
    Hourly,
    Monthly,
}

/// Base pay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySettings {
    pub pay_type: PayType,
    /// Yen per hour, or per month for [`PayType::Monthly`]
    pub amount: i64,
    /// Worked time is split into units of this many minutes
    pub time_unit_minutes: i32,
    pub time_rounding: RoundingMethod,
    /// Only count time spent serving a guest
    #[serde(default)]
    pub only_serving: bool,
    #[serde(default)]
    pub include_break: bool,
}

/// Back (歩合) categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackCategory {
    /// Store-wide sales back
    Store,
    /// In-house nomination (場内指名)
    Jounai,
    /// Named request (本指名)
    Shimei,
    /// Accompanied arrival (同伴)
    Douhan,
}

/// How a back amount is derived from a sale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackCalculation {
    #[default]
    TotalPercent,
    SubtotalPercent,
    Fixed,
}

/// Cumulative measure that variable tiers are keyed by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierBasis {
    #[default]
    Count,
    Amount,
}

/// Window over which tier counters accumulate before resetting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPeriod {
    Week,
    HalfMonth,
    #[default]
    Month,
    Quarter,
    HalfYear,
    Year,
}

/// One step of a variable back
///
/// Exactly the threshold matching the tier basis is meaningful; the other one
/// is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackTier {
    pub min_count: Option<i64>,
    pub min_amount: Option<i64>,
    pub percentage: Option<f64>,
    pub fixed_amount: Option<i64>,
}

impl BackTier {
    /// Threshold for the given basis
    pub fn threshold(&self, basis: TierBasis) -> Option<i64> {
        match basis {
            TierBasis::Count => self.min_count,
            TierBasis::Amount => self.min_amount,
        }
    }
}

/// Tiered override of a back's base rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableBack {
    pub basis: TierBasis,
    pub reset_period: ResetPeriod,
    pub tiers: Vec<BackTier>,
}

/// Back settings for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackSettings {
    pub calculation_type: BackCalculation,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub fixed_amount: i64,
    #[serde(default)]
    pub rounding_method: RoundingMethod,
    /// 1, 10, 100, 1000 or 10000 yen
    pub rounding_unit: i64,
    pub variable: Option<VariableBack>,
}

/// Whether occurrence counts are pooled across back categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SharedCountType {
    /// Each category counts on its own
    #[default]
    None,
    /// One pool for every category
    All,
    /// Jounai and shimei share a pool
    JounaiShimei,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionType {
    Percentage,
    Fixed,
}

/// Payroll deduction, applied in ascending `order`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    /// Stable id within the system (UUID string)
    pub id: String,
    pub name: String,
    pub deduction_type: DeductionType,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub amount: i64,
    pub order: i32,
}

/// The four back categories a system may configure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackSet {
    pub store: Option<BackSettings>,
    pub jounai: Option<BackSettings>,
    pub shimei: Option<BackSettings>,
    pub douhan: Option<BackSettings>,
}

impl BackSet {
    pub fn get(&self, category: BackCategory) -> Option<&BackSettings> {
        match category {
            BackCategory::Store => self.store.as_ref(),
            BackCategory::Jounai => self.jounai.as_ref(),
            BackCategory::Shimei => self.shimei.as_ref(),
            BackCategory::Douhan => self.douhan.as_ref(),
        }
    }

    pub fn get_mut(&mut self, category: BackCategory) -> Option<&mut BackSettings> {
        match category {
            BackCategory::Store => self.store.as_mut(),
            BackCategory::Jounai => self.jounai.as_mut(),
            BackCategory::Shimei => self.shimei.as_mut(),
            BackCategory::Douhan => self.douhan.as_mut(),
        }
    }

    /// Configured categories with their settings
    pub fn iter(&self) -> impl Iterator<Item = (BackCategory, &BackSettings)> {
        [
            BackCategory::Store,
            BackCategory::Jounai,
            BackCategory::Shimei,
            BackCategory::Douhan,
        ]
        .into_iter()
        .filter_map(|c| self.get(c).map(|s| (c, s)))
    }
}

/// Salary system entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalarySystem {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub target: SalaryTarget,
    pub hourly: Option<HourlySettings>,
    pub backs: BackSet,
    pub shared_count_type: SharedCountType,
    pub deductions: Vec<Deduction>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create / full-replace payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalarySystemInput {
    pub name: String,
    pub target: SalaryTarget,
    pub hourly: Option<HourlySettings>,
    #[serde(default)]
    pub backs: BackSet,
    #[serde(default)]
    pub shared_count_type: SharedCountType,
    #[serde(default)]
    pub deductions: Vec<Deduction>,
}

/// Deduction reorder payload: ids in their new order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionOrder {
    pub deduction_ids: Vec<String>,
}
