//! Settlement calculator.
//!
//! Given an invoice or ticket draft and the balances available to it, works
//! out how much of the document is covered by discount and balance draws and
//! how much is still owed. The deduction waterfall runs in a fixed order,
//! each stage consuming only what the previous stages left:
//!
//! 1. subtotal of all line items
//! 2. percentage discount
//! 3. billed party's deposit
//! 4. agent credit line (agent documents only)
//!
//! The vendor-balance offset is computed alongside but never changes the
//! customer-facing total.

pub mod calculator;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use calculator::compute_settlement;
pub use error::SettlementError;
pub use types::{
    AvailableBalances, CustomerType, LineItem, SettlementDraft, SettlementResult,
    VendorBalanceChoice,
};
