//! Customers, agents, and vendors.
//!
//! A party is anyone whose balance the agency tracks. Customers only pre-pay
//! (deposit); agents and vendors can also run a credit line.

pub mod types;

pub use types::{BalanceKind, CreatePartyInput, Party, PartyKind, PartySnapshot};
