//! Money rounding rules.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` and every derived figure is rounded
//! half-up to two decimals at the point it is computed, so persisted values
//! and previewed values are the same numbers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Number of decimal places kept for a discount percentage.
pub const PERCENT_SCALE: u32 = 4;

/// Largest magnitude a money column (`decimal(16, 2)`) can hold.
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_874_919_423, 2_328_306, 0, false, MONEY_SCALE);

/// Rounds an amount half-up (midpoint away from zero) to [`MONEY_SCALE`] places.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if the amount fits a money column.
#[must_use]
pub fn within_money_range(amount: Decimal) -> bool {
    amount.abs() <= MAX_MONEY
}

/// Clamps a percentage into `0..=100` and rounds it half-up to
/// [`PERCENT_SCALE`] places, the precision it is stored with.
#[must_use]
pub fn clamp_percent(percent: Decimal) -> Decimal {
    percent
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(10.005), dec!(10.01))]
    #[case(dec!(10.004), dec!(10.00))]
    #[case(dec!(2.675), dec!(2.68))]
    #[case(dec!(-1.005), dec!(-1.01))]
    #[case(dec!(99), dec!(99.00))]
    fn test_round_money_half_up(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_round_money_keeps_two_places() {
        assert_eq!(round_money(dec!(1.23456)).scale(), 2);
    }

    #[rstest]
    #[case(dec!(-5), dec!(0))]
    #[case(dec!(0), dec!(0))]
    #[case(dec!(12.5), dec!(12.5))]
    #[case(dec!(100), dec!(100))]
    #[case(dec!(150), dec!(100))]
    #[case(dec!(33.33335), dec!(33.3334))]
    #[case(dec!(12.34564), dec!(12.3456))]
    fn test_clamp_percent(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(clamp_percent(input), expected);
    }

    #[test]
    fn test_max_money_matches_column_capacity() {
        assert_eq!(MAX_MONEY, dec!(99999999999999.99));
        assert!(within_money_range(MAX_MONEY));
        assert!(within_money_range(-MAX_MONEY));
        assert!(!within_money_range(MAX_MONEY + dec!(0.01)));
        assert!(!within_money_range(Decimal::MAX));
    }
}
