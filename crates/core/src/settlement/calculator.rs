//! The deduction waterfall.

use rust_decimal::{Decimal, RoundingStrategy};
use voyra_shared::types::{MONEY_SCALE, clamp_percent, round_money, within_money_range};

use super::error::SettlementError;
use super::types::{AvailableBalances, CustomerType, SettlementDraft, SettlementResult};

/// Computes the settlement of a draft against the given balances.
///
/// Pure: calling it twice with the same input yields the same result, so it
/// backs both live previews and the recomputation at issuance time.
///
/// # Errors
///
/// Returns `AmountOutOfRange` if a line total, the subtotal or the vendor
/// cost does not fit a money column.
pub fn compute_settlement(
    draft: &SettlementDraft,
    balances: &AvailableBalances,
) -> Result<SettlementResult, SettlementError> {
    let subtotal = draft
        .line_items
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| {
            sum.checked_add(line.line_total()?)
                .filter(|sum| within_money_range(*sum))
                .ok_or(SettlementError::AmountOutOfRange { field: "subtotal" })
        })?;

    let discount_percent = clamp_percent(draft.discount_percent);
    let discount_amount = round_money(subtotal * discount_percent / Decimal::ONE_HUNDRED);
    let amount_after_discount = subtotal - discount_amount;
    let mut remainder = amount_after_discount;

    let deposit_used = if draft.use_deposit {
        draw(balances.customer_deposit, remainder)
    } else {
        Decimal::ZERO
    };
    remainder -= deposit_used;

    let agent_credit_used = match draft.customer_type {
        CustomerType::Agent if draft.use_agent_credit => draw(balances.agent_credit, remainder),
        CustomerType::Agent | CustomerType::Customer => Decimal::ZERO,
    };
    remainder -= agent_credit_used;

    let total = remainder;

    let vendor_cost = round_money(draft.vendor_cost.max(Decimal::ZERO));
    if !within_money_range(vendor_cost) {
        return Err(SettlementError::AmountOutOfRange {
            field: "vendor_cost",
        });
    }
    let vendor_balance_deducted =
        draw(balances.vendor_balance(draft.use_vendor_balance), vendor_cost);

    Ok(SettlementResult {
        subtotal,
        discount_percent,
        discount_amount,
        amount_after_discount,
        deposit_used,
        agent_credit_used,
        total,
        vendor_cost,
        vendor_balance_deducted,
        vendor_balance_source: draft.use_vendor_balance,
        vendor_payable: vendor_cost - vendor_balance_deducted,
        profit_margin: total - vendor_cost,
    })
}

/// `min(available, owed)`, never negative.
///
/// Negative balances count as nothing available. The available side is
/// truncated to cents so a draw can never exceed the balance it comes from.
fn draw(available: Decimal, owed: Decimal) -> Decimal {
    let available = available
        .max(Decimal::ZERO)
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero);
    available.min(owed.max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::types::{LineItem, VendorBalanceChoice};
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use voyra_shared::types::MAX_MONEY;

    fn line(quantity: u32, unit_price: Decimal) -> LineItem {
        LineItem {
            description: "Package tour".to_string(),
            quantity,
            unit_price,
        }
    }

    fn draft(customer_type: CustomerType, lines: Vec<LineItem>) -> SettlementDraft {
        SettlementDraft {
            customer_type,
            line_items: lines,
            discount_percent: Decimal::ZERO,
            use_deposit: false,
            use_agent_credit: false,
            vendor_cost: Decimal::ZERO,
            use_vendor_balance: VendorBalanceChoice::None,
        }
    }

    #[test]
    fn test_discount_then_customer_deposit() {
        let mut d = draft(CustomerType::Customer, vec![line(1, dec!(1000))]);
        d.discount_percent = dec!(10);
        d.use_deposit = true;
        let balances = AvailableBalances {
            customer_deposit: dec!(300),
            ..AvailableBalances::default()
        };

        let result = compute_settlement(&d, &balances).unwrap();

        assert_eq!(result.discount_amount, dec!(100));
        assert_eq!(result.amount_after_discount, dec!(900));
        assert_eq!(result.deposit_used, dec!(300));
        assert_eq!(result.total, dec!(600));
        assert!(result.total_identity_holds());
    }

    #[test]
    fn test_agent_credit_without_deposit() {
        let mut d = draft(CustomerType::Agent, vec![line(1, dec!(500))]);
        d.use_agent_credit = true;
        let balances = AvailableBalances {
            customer_deposit: dec!(1000),
            agent_credit: dec!(50),
            ..AvailableBalances::default()
        };

        let result = compute_settlement(&d, &balances).unwrap();

        assert_eq!(result.deposit_used, Decimal::ZERO);
        assert_eq!(result.agent_credit_used, dec!(50));
        assert_eq!(result.total, dec!(450));
    }

    #[test]
    fn test_vendor_credit_does_not_touch_total() {
        let mut d = draft(CustomerType::Customer, vec![line(2, dec!(150))]);
        d.vendor_cost = dec!(200);
        d.use_vendor_balance = VendorBalanceChoice::Credit;
        let balances = AvailableBalances {
            vendor_credit: dec!(80),
            vendor_deposit: dec!(500),
            ..AvailableBalances::default()
        };

        let result = compute_settlement(&d, &balances).unwrap();

        assert_eq!(result.vendor_balance_deducted, dec!(80));
        assert_eq!(result.vendor_payable, dec!(120));
        assert_eq!(result.total, dec!(300));
        assert_eq!(result.profit_margin, dec!(100));
    }

    #[test]
    fn test_deposit_clamps_to_available() {
        let mut d = draft(CustomerType::Customer, vec![line(4, dec!(250))]);
        d.use_deposit = true;
        let balances = AvailableBalances {
            customer_deposit: dec!(100),
            ..AvailableBalances::default()
        };

        let result = compute_settlement(&d, &balances).unwrap();

        assert_eq!(result.deposit_used, dec!(100));
        assert_eq!(result.total, dec!(900));
    }

    #[test]
    fn test_agent_credit_ignored_for_customer_documents() {
        let mut d = draft(CustomerType::Customer, vec![line(1, dec!(500))]);
        d.use_agent_credit = true;
        let balances = AvailableBalances {
            agent_credit: dec!(500),
            ..AvailableBalances::default()
        };

        let result = compute_settlement(&d, &balances).unwrap();

        assert_eq!(result.agent_credit_used, Decimal::ZERO);
        assert_eq!(result.total, dec!(500));
    }

    #[test]
    fn test_deposit_runs_before_agent_credit() {
        let mut d = draft(CustomerType::Agent, vec![line(1, dec!(500))]);
        d.use_deposit = true;
        d.use_agent_credit = true;
        let balances = AvailableBalances {
            customer_deposit: dec!(400),
            agent_credit: dec!(400),
            ..AvailableBalances::default()
        };

        let result = compute_settlement(&d, &balances).unwrap();

        assert_eq!(result.deposit_used, dec!(400));
        assert_eq!(result.agent_credit_used, dec!(100));
        assert_eq!(result.total, Decimal::ZERO);
    }

    #[test]
    fn test_negative_balances_count_as_zero() {
        let mut d = draft(CustomerType::Customer, vec![line(1, dec!(100))]);
        d.use_deposit = true;
        d.vendor_cost = dec!(60);
        d.use_vendor_balance = VendorBalanceChoice::Deposit;
        let balances = AvailableBalances {
            customer_deposit: dec!(-20),
            vendor_deposit: dec!(-5),
            ..AvailableBalances::default()
        };

        let result = compute_settlement(&d, &balances).unwrap();

        assert_eq!(result.deposit_used, Decimal::ZERO);
        assert_eq!(result.vendor_balance_deducted, Decimal::ZERO);
        assert_eq!(result.total, dec!(100));
    }

    #[test]
    fn test_zero_vendor_cost_never_deducts() {
        let mut d = draft(CustomerType::Customer, vec![line(1, dec!(100))]);
        d.use_vendor_balance = VendorBalanceChoice::Credit;
        let balances = AvailableBalances {
            vendor_credit: dec!(1000),
            ..AvailableBalances::default()
        };

        assert_eq!(
            compute_settlement(&d, &balances).unwrap().vendor_balance_deducted,
            Decimal::ZERO
        );
    }

    #[test]
    fn test_empty_draft_is_all_zero() {
        let d = draft(CustomerType::Customer, vec![]);
        let result = compute_settlement(&d, &AvailableBalances::default()).unwrap();
        assert_eq!(result.subtotal, Decimal::ZERO);
        assert_eq!(result.total, Decimal::ZERO);
        assert!(result.total_identity_holds());
    }

    #[rstest]
    #[case(dec!(1000), dec!(10), dec!(100))]
    #[case(dec!(99.99), dec!(12.5), dec!(12.50))]
    #[case(dec!(33.33), dec!(33.3333), dec!(11.11))]
    #[case(dec!(0.05), dec!(50), dec!(0.03))]
    #[case(dec!(500), dec!(150), dec!(500))]
    #[case(dec!(500), dec!(-10), dec!(0))]
    fn test_discount_rounding(
        #[case] unit_price: Decimal,
        #[case] percent: Decimal,
        #[case] expected: Decimal,
    ) {
        let mut d = draft(CustomerType::Customer, vec![line(1, unit_price)]);
        d.discount_percent = percent;
        let result = compute_settlement(&d, &AvailableBalances::default()).unwrap();
        assert_eq!(result.discount_amount, expected);
        assert!(result.total_identity_holds());
    }

    #[test]
    fn test_overflowing_line_is_rejected() {
        let d = draft(CustomerType::Customer, vec![line(2, Decimal::MAX)]);
        assert_eq!(
            compute_settlement(&d, &AvailableBalances::default()),
            Err(SettlementError::AmountOutOfRange { field: "line_total" })
        );
    }

    #[test]
    fn test_subtotal_beyond_column_capacity_is_rejected() {
        let d = draft(
            CustomerType::Customer,
            vec![line(1, MAX_MONEY), line(1, dec!(0.01))],
        );
        assert_eq!(
            compute_settlement(&d, &AvailableBalances::default()),
            Err(SettlementError::AmountOutOfRange { field: "subtotal" })
        );

        let exact = draft(CustomerType::Customer, vec![line(1, MAX_MONEY)]);
        let result = compute_settlement(&exact, &AvailableBalances::default()).unwrap();
        assert_eq!(result.total, MAX_MONEY);
    }

    #[test]
    fn test_oversized_vendor_cost_is_rejected() {
        let mut d = draft(CustomerType::Customer, vec![line(1, dec!(100))]);
        d.vendor_cost = Decimal::MAX;
        assert_eq!(
            compute_settlement(&d, &AvailableBalances::default()),
            Err(SettlementError::AmountOutOfRange {
                field: "vendor_cost"
            })
        );
    }

    #[test]
    fn test_discount_percent_kept_at_four_places() {
        let mut d = draft(CustomerType::Customer, vec![line(1, dec!(100000))]);
        d.discount_percent = dec!(33.33335);
        let result = compute_settlement(&d, &AvailableBalances::default()).unwrap();
        assert_eq!(result.discount_percent, dec!(33.3334));
        assert_eq!(result.discount_amount, dec!(33333.40));
        assert!(result.total_identity_holds());
    }

    #[test]
    fn test_line_totals_use_rounded_unit_prices() {
        let d = draft(CustomerType::Customer, vec![line(3, dec!(10.335))]);
        let result = compute_settlement(&d, &AvailableBalances::default()).unwrap();
        assert_eq!(result.subtotal, dec!(31.02));
    }

    #[rstest]
    #[case(dec!(100.005), dec!(100.00))]
    #[case(dec!(0.009), dec!(0.00))]
    #[case(dec!(42), dec!(42))]
    fn test_draw_truncates_available(#[case] available: Decimal, #[case] expected: Decimal) {
        assert_eq!(draw(available, dec!(1000)), expected);
    }
}
