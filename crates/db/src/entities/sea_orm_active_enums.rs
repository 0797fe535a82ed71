//! `SeaORM` active enums, stored as lowercase strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use voyra_core::{issuance, ledger, party, settlement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PartyKind {
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "agent")]
    Agent,
    #[sea_orm(string_value = "vendor")]
    Vendor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum BalanceKind {
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EntryType {
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "debit")]
    Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum LedgerSourceKind {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "opening")]
    Opening,
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "ticket")]
    Ticket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum CustomerType {
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "agent")]
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum VendorBalanceChoice {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "deposit")]
    Deposit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Mirrors a core enum one-to-one in both directions.
macro_rules! mirror_enum {
    ($db:ident, $module:ident::$core:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$module::$core> for $db {
            fn from(value: $module::$core) -> Self {
                match value {
                    $($module::$core::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $module::$core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(PartyKind, party::PartyKind { Customer, Agent, Vendor });
mirror_enum!(BalanceKind, party::BalanceKind { Deposit, Credit });
mirror_enum!(EntryType, ledger::EntryType { Credit, Debit });
mirror_enum!(CustomerType, settlement::CustomerType { Customer, Agent });
mirror_enum!(VendorBalanceChoice, settlement::VendorBalanceChoice { None, Credit, Deposit });
mirror_enum!(PaymentMethod, issuance::PaymentMethod { Cash, Card, Credit });
mirror_enum!(DocumentStatus, issuance::DocumentStatus { Pending, Paid, Cancelled });
