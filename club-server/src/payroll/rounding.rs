//! Yen and minute rounding
//!
//! Uses rust_decimal so percentages of large totals do not pick up float
//! error before rounding.

use rust_decimal::prelude::*;
use shared::models::RoundingMethod;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// `value × pct / 100`, saturating at the Decimal range
#[inline]
pub fn percent_of(value: Decimal, pct: f64) -> Decimal {
    value.saturating_mul(to_decimal(pct)) / Decimal::ONE_HUNDRED
}

/// Whole yen, saturating at the i64 range instead of wrapping to zero
pub fn to_yen(value: Decimal) -> i64 {
    value.to_i64().unwrap_or(if value.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Round `amount` to a multiple of `unit` yen
///
/// `round` is half-up (away from zero), `up` the ceiling, `down` the floor.
/// A unit below 1 is treated as 1.
pub fn apply_rounding(amount: Decimal, method: RoundingMethod, unit: i64) -> i64 {
    let unit = Decimal::from(unit.max(1));
    let units = amount / unit;
    let rounded = match method {
        RoundingMethod::Round => {
            units.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        }
        RoundingMethod::Up => units.ceil(),
        RoundingMethod::Down => units.floor(),
    };
    to_yen(rounded.saturating_mul(unit))
}

/// Round a duration to a multiple of `unit` minutes
pub fn round_minutes(minutes: i64, unit: i64, method: RoundingMethod) -> i64 {
    apply_rounding(Decimal::from(minutes), method, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_rounding_methods() {
        let amount = Decimal::from(12_345);
        assert_eq!(apply_rounding(amount, RoundingMethod::Round, 100), 12_300);
        assert_eq!(apply_rounding(amount, RoundingMethod::Up, 100), 12_400);
        assert_eq!(apply_rounding(amount, RoundingMethod::Down, 1000), 12_000);
        assert_eq!(apply_rounding(amount, RoundingMethod::Round, 10_000), 10_000);
    }

    #[test]
    fn test_round_is_half_up() {
        assert_eq!(apply_rounding(Decimal::from(150), RoundingMethod::Round, 100), 200);
        assert_eq!(apply_rounding(Decimal::new(15, 1), RoundingMethod::Round, 1), 2);
        assert_eq!(apply_rounding(Decimal::new(14, 1), RoundingMethod::Round, 1), 1);
    }

    #[test]
    fn test_zero_unit_means_yen() {
        assert_eq!(apply_rounding(Decimal::new(995, 1), RoundingMethod::Down, 0), 99);
    }

    #[test]
    fn test_round_minutes() {
        assert_eq!(round_minutes(47, 15, RoundingMethod::Down), 45);
        assert_eq!(round_minutes(47, 15, RoundingMethod::Up), 60);
        assert_eq!(round_minutes(52, 15, RoundingMethod::Round), 45);
        assert_eq!(round_minutes(53, 15, RoundingMethod::Round), 60);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(Decimal::from(10_000), 15.0), Decimal::from(1500));
    }

    #[test]
    fn test_huge_values_saturate() {
        assert_eq!(percent_of(Decimal::MAX, 50.0), Decimal::MAX / Decimal::ONE_HUNDRED);
        assert_eq!(to_yen(Decimal::MAX), i64::MAX);
        assert_eq!(to_yen(Decimal::MIN), i64::MIN);
        assert_eq!(apply_rounding(Decimal::MAX, RoundingMethod::Up, 10_000), i64::MAX);
        assert_eq!(to_yen(Decimal::new(12_999, 1)), 1299);
    }
}
