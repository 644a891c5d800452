//! Salary system validation
//!
//! Checks an input and returns it normalized: tiers sorted by threshold,
//! deductions sorted by `order` and renumbered 0..n, blank deduction ids
//! filled with fresh UUIDs.

use shared::error::ErrorCode;
use shared::models::{BackCategory, BackSettings, Deduction, DeductionType, SalarySystemInput};

use crate::utils::validation::{
    MAX_NAME_LEN, validate_amount, validate_non_negative, validate_percentage,
    validate_required_text, validate_rounding_unit,
};
use crate::utils::{AppError, AppResult};

pub fn normalize_system(mut input: SalarySystemInput) -> AppResult<SalarySystemInput> {
    validate_required_text(&input.name, "name", MAX_NAME_LEN)?;

    if let Some(hourly) = &input.hourly {
        validate_amount(hourly.amount, "hourly.amount")?;
        if !(1..=60).contains(&hourly.time_unit_minutes) {
            return Err(AppError::validation(format!(
                "hourly.time_unit_minutes must be between 1 and 60, got {}",
                hourly.time_unit_minutes
            )));
        }
    }

    for category in [
        BackCategory::Store,
        BackCategory::Jounai,
        BackCategory::Shimei,
        BackCategory::Douhan,
    ] {
        if let Some(back) = input.backs.get_mut(category) {
            normalize_back(back)?;
        }
    }

    input.deductions = normalize_deductions(std::mem::take(&mut input.deductions))?;
    Ok(input)
}

fn normalize_back(back: &mut BackSettings) -> AppResult<()> {
    validate_percentage(back.percentage, "back.percentage")?;
    validate_amount(back.fixed_amount, "back.fixed_amount")?;
    validate_rounding_unit(back.rounding_unit, "back.rounding_unit")?;

    let Some(variable) = back.variable.as_mut() else {
        return Ok(());
    };
    let basis = variable.basis;

    for tier in &variable.tiers {
        let Some(threshold) = tier.threshold(basis) else {
            return Err(AppError::with_message(
                ErrorCode::InvalidTierOrder,
                format!("Every tier needs a {basis:?} threshold"),
            ));
        };
        validate_non_negative(threshold, "tier threshold")?;
        if let Some(pct) = tier.percentage {
            validate_percentage(pct, "tier.percentage")?;
        }
        if let Some(amount) = tier.fixed_amount {
            validate_amount(amount, "tier.fixed_amount")?;
        }
    }

    variable.tiers.sort_by_key(|t| t.threshold(basis));
    if variable
        .tiers
        .windows(2)
        .any(|w| w[0].threshold(basis) == w[1].threshold(basis))
    {
        return Err(AppError::with_message(
            ErrorCode::InvalidTierOrder,
            "Tier thresholds must be unique",
        ));
    }
    Ok(())
}

fn normalize_deductions(mut deductions: Vec<Deduction>) -> AppResult<Vec<Deduction>> {
    for d in deductions.iter_mut() {
        validate_required_text(&d.name, "deduction.name", MAX_NAME_LEN)?;
        match d.deduction_type {
            DeductionType::Percentage => validate_percentage(d.percentage, "deduction.percentage")?,
            DeductionType::Fixed => validate_amount(d.amount, "deduction.amount")?,
        }
        if d.id.trim().is_empty() {
            d.id = uuid::Uuid::new_v4().to_string();
        }
    }

    let mut ids: Vec<&str> = deductions.iter().map(|d| d.id.as_str()).collect();
    ids.sort_unstable();
    if ids.windows(2).any(|w| w[0] == w[1]) {
        return Err(AppError::validation("Deduction ids must be unique"));
    }

    deductions.sort_by_key(|d| d.order);
    for (i, d) in deductions.iter_mut().enumerate() {
        d.order = i as i32;
    }
    Ok(deductions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::MAX_YEN_AMOUNT;
    use shared::models::{
        BackCalculation, BackSet, BackTier, ResetPeriod, RoundingMethod, SalaryTarget,
        SharedCountType, TierBasis, VariableBack,
    };

    fn tier(min_count: Option<i64>, pct: f64) -> BackTier {
        BackTier {
            min_count,
            min_amount: None,
            percentage: Some(pct),
            fixed_amount: None,
        }
    }

    fn with_tiers(tiers: Vec<BackTier>) -> SalarySystemInput {
        SalarySystemInput {
            name: "Tiered".into(),
            target: SalaryTarget::Cast,
            hourly: None,
            backs: BackSet {
                store: Some(BackSettings {
                    calculation_type: BackCalculation::TotalPercent,
                    percentage: 5.0,
                    fixed_amount: 0,
                    rounding_method: RoundingMethod::Down,
                    rounding_unit: 100,
                    variable: Some(VariableBack {
                        basis: TierBasis::Count,
                        reset_period: ResetPeriod::Month,
                        tiers,
                    }),
                }),
                ..Default::default()
            },
            shared_count_type: SharedCountType::None,
            deductions: vec![],
        }
    }

    fn thresholds(input: &SalarySystemInput) -> Vec<Option<i64>> {
        let variable = input.backs.store.as_ref().unwrap().variable.as_ref().unwrap();
        variable.tiers.iter().map(|t| t.min_count).collect()
    }

    #[test]
    fn test_tiers_are_sorted() {
        let input = normalize_system(with_tiers(vec![tier(Some(10), 15.0), tier(Some(5), 10.0)])).unwrap();
        assert_eq!(thresholds(&input), vec![Some(5), Some(10)]);
    }

    #[test]
    fn test_duplicate_or_missing_threshold_rejected() {
        let err = normalize_system(with_tiers(vec![tier(Some(5), 10.0), tier(Some(5), 15.0)])).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTierOrder);

        let err = normalize_system(with_tiers(vec![tier(None, 10.0)])).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTierOrder);
    }

    #[test]
    fn test_rates_and_units_checked() {
        let err = normalize_system(with_tiers(vec![tier(Some(5), 120.0)])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let mut input = with_tiers(vec![]);
        input.backs.store.as_mut().unwrap().rounding_unit = 50;
        let err = normalize_system(input).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRoundingUnit);
    }

    #[test]
    fn test_amounts_are_capped() {
        let mut input = with_tiers(vec![]);
        input.hourly = Some(shared::models::HourlySettings {
            pay_type: shared::models::PayType::Hourly,
            amount: i64::MAX,
            time_unit_minutes: 15,
            time_rounding: RoundingMethod::Down,
            only_serving: false,
            include_break: false,
        });
        let err = normalize_system(input).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let mut input = with_tiers(vec![BackTier {
            min_count: Some(1),
            min_amount: None,
            percentage: None,
            fixed_amount: Some(MAX_YEN_AMOUNT + 1),
        }]);
        assert!(normalize_system(input.clone()).is_err());
        input.backs.store.as_mut().unwrap().variable = None;
        input.backs.store.as_mut().unwrap().fixed_amount = MAX_YEN_AMOUNT;
        assert!(normalize_system(input).is_ok());
    }

    #[test]
    fn test_deductions_sorted_and_ids_filled() {
        let mut input = with_tiers(vec![]);
        input.deductions = vec![
            Deduction {
                id: "tax".into(),
                name: "Withholding".into(),
                deduction_type: DeductionType::Percentage,
                percentage: 10.21,
                amount: 0,
                order: 5,
            },
            Deduction {
                id: String::new(),
                name: "Dress".into(),
                deduction_type: DeductionType::Fixed,
                percentage: 0.0,
                amount: 3000,
                order: 1,
            },
        ];
        let input = normalize_system(input).unwrap();
        assert_eq!(input.deductions[0].name, "Dress");
        assert_eq!(input.deductions[0].order, 0);
        assert!(!input.deductions[0].id.is_empty());
        assert_eq!(input.deductions[1].id, "tax");
        assert_eq!(input.deductions[1].order, 1);
    }
}
