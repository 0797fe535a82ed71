//! Shared types and configuration for Voyra.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for parties, documents, and ledger rows
//! - Money rounding rules (half-up, 2 decimals)
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, LedgerConfig};
