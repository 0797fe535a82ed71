//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{
    MAX_MONEY, MONEY_SCALE, PERCENT_SCALE, clamp_percent, round_money, within_money_range,
};
