//! `SeaORM` entity definitions.
//!
//! Crate-private: balances on `parties` change only through the party
//! ledger repository, never through a caller-built active model.

pub mod invoice_line_items;
pub mod invoices;
pub mod ledger_transactions;
pub mod parties;
pub mod sea_orm_active_enums;
pub mod tickets;
