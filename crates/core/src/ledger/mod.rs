//! Party balance ledger.
//!
//! This module implements the rules the ledger store enforces:
//! - Ledger entries (credits increase, debits decrease a balance)
//! - Running balance bookkeeping and history replay
//! - Entry validation against the party's kind
//! - Error types for ledger operations

pub mod balance;
pub mod entry;
pub mod error;
pub mod validation;

pub use balance::{RunningBalance, apply_entry, replay, verify_history};
pub use entry::{EntryType, LedgerEntryInput, LedgerSource, LedgerTransaction};
pub use error::LedgerError;
pub use validation::validate_manual_entry;
