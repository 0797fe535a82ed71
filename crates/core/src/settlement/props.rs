//! Property-based tests for the settlement calculator.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::calculator::compute_settlement;
use super::types::{
    AvailableBalances, CustomerType, LineItem, SettlementDraft, VendorBalanceChoice,
};

/// Non-negative money amount with cents.
fn arb_money() -> impl Strategy<Value = Decimal> {
    (0i64..5_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Balance that may be negative (vendor edge cases).
fn arb_balance() -> impl Strategy<Value = Decimal> {
    (-100_000i64..5_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Discount percentage, including out-of-range values that get clamped.
fn arb_percent() -> impl Strategy<Value = Decimal> {
    (-5_000i64..15_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_line() -> impl Strategy<Value = LineItem> {
    (1u32..20, arb_money()).prop_map(|(quantity, unit_price)| LineItem {
        description: "Line".to_string(),
        quantity,
        unit_price,
    })
}

fn arb_draft() -> impl Strategy<Value = SettlementDraft> {
    (
        prop_oneof![Just(CustomerType::Customer), Just(CustomerType::Agent)],
        prop::collection::vec(arb_line(), 1..8),
        arb_percent(),
        any::<bool>(),
        any::<bool>(),
        arb_money(),
        prop_oneof![
            Just(VendorBalanceChoice::None),
            Just(VendorBalanceChoice::Credit),
            Just(VendorBalanceChoice::Deposit),
        ],
    )
        .prop_map(
            |(
                customer_type,
                line_items,
                discount_percent,
                use_deposit,
                use_agent_credit,
                vendor_cost,
                use_vendor_balance,
            )| SettlementDraft {
                customer_type,
                line_items,
                discount_percent,
                use_deposit,
                use_agent_credit,
                vendor_cost,
                use_vendor_balance,
            },
        )
}

fn arb_balances() -> impl Strategy<Value = AvailableBalances> {
    (arb_balance(), arb_balance(), arb_balance(), arb_balance()).prop_map(
        |(customer_deposit, agent_credit, vendor_deposit, vendor_credit)| AvailableBalances {
            customer_deposit,
            agent_credit,
            vendor_deposit,
            vendor_credit,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =========================================================================
    // Property 2: Bounded Deduction
    // =========================================================================

    /// Every draw is bounded by the balance it comes from and by what was
    /// still owed when its stage ran.
    #[test]
    fn prop_deductions_are_bounded(draft in arb_draft(), balances in arb_balances()) {
        let result = compute_settlement(&draft, &balances).unwrap();

        let deposit_available = balances.customer_deposit.max(Decimal::ZERO);
        prop_assert!(result.deposit_used >= Decimal::ZERO);
        prop_assert!(result.deposit_used <= deposit_available);
        prop_assert!(result.deposit_used <= result.amount_after_discount);

        let after_deposit = result.amount_after_discount - result.deposit_used;
        prop_assert!(result.agent_credit_used >= Decimal::ZERO);
        prop_assert!(result.agent_credit_used <= balances.agent_credit.max(Decimal::ZERO));
        prop_assert!(result.agent_credit_used <= after_deposit);
        if draft.customer_type == CustomerType::Customer {
            prop_assert_eq!(result.agent_credit_used, Decimal::ZERO);
        }

        let vendor_available = balances
            .vendor_balance(draft.use_vendor_balance)
            .max(Decimal::ZERO);
        prop_assert!(result.vendor_balance_deducted >= Decimal::ZERO);
        prop_assert!(result.vendor_balance_deducted <= vendor_available);
        prop_assert!(result.vendor_balance_deducted <= result.vendor_cost);

        prop_assert!(result.total >= Decimal::ZERO);
    }

    // =========================================================================
    // Property 3: Total Identity
    // =========================================================================

    /// `total = subtotal − discount − deposit − agent credit`, and the vendor
    /// offset never leaks into the customer-facing total.
    #[test]
    fn prop_total_identity(draft in arb_draft(), balances in arb_balances()) {
        let result = compute_settlement(&draft, &balances).unwrap();
        prop_assert!(result.total_identity_holds());

        let mut without_vendor = draft.clone();
        without_vendor.use_vendor_balance = VendorBalanceChoice::None;
        let baseline = compute_settlement(&without_vendor, &balances).unwrap();
        prop_assert_eq!(baseline.total, result.total);
    }

    /// Every derived amount is already at money scale.
    #[test]
    fn prop_amounts_have_two_decimals(draft in arb_draft(), balances in arb_balances()) {
        let result = compute_settlement(&draft, &balances).unwrap();
        for amount in [
            result.subtotal,
            result.discount_amount,
            result.deposit_used,
            result.agent_credit_used,
            result.total,
            result.vendor_balance_deducted,
            result.vendor_payable,
        ] {
            prop_assert_eq!(amount, amount.round_dp(2));
        }
    }

    // =========================================================================
    // Property 5: Idempotent Preview
    // =========================================================================

    /// Computing twice from the same input yields the same output.
    #[test]
    fn prop_preview_is_idempotent(draft in arb_draft(), balances in arb_balances()) {
        let first = compute_settlement(&draft, &balances).unwrap();
        let second = compute_settlement(&draft, &balances).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Disabling every toggle leaves the total at subtotal minus discount.
    #[test]
    fn prop_no_toggles_no_draws(draft in arb_draft(), balances in arb_balances()) {
        let mut plain = draft;
        plain.use_deposit = false;
        plain.use_agent_credit = false;
        plain.use_vendor_balance = VendorBalanceChoice::None;

        let result = compute_settlement(&plain, &balances).unwrap();
        prop_assert_eq!(result.deposit_used, Decimal::ZERO);
        prop_assert_eq!(result.agent_credit_used, Decimal::ZERO);
        prop_assert_eq!(result.vendor_balance_deducted, Decimal::ZERO);
        prop_assert_eq!(result.total, result.subtotal - result.discount_amount);
        prop_assert!(result.discount_amount <= result.subtotal);
        prop_assert!(result.discount_percent >= dec!(0) && result.discount_percent <= dec!(100));
    }
}
