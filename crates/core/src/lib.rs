//! Core business logic for Voyra.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `party` - Customers, agents and vendors with their balance kinds
//! - `ledger` - Balance mutation rules and the running-balance invariant
//! - `settlement` - The deduction waterfall for invoices and tickets
//! - `issuance` - Draft validation and the deduction plan applied at issuance
//! - `reports` - Read-only aggregation over documents and ledger rows

pub mod issuance;
pub mod ledger;
pub mod party;
pub mod reports;
pub mod settlement;
