//! `SeaORM` Entity for invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{
    CustomerType, DocumentStatus, PaymentMethod, VendorBalanceChoice,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_type: CustomerType,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub discount_percent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub discount_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub deposit_used: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub agent_credit_used: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub vendor_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub vendor_balance_deducted: Decimal,
    pub use_vendor_balance: VendorBalanceChoice,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub status: DocumentStatus,
    pub issued_by: String,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice_line_items::Entity")]
    InvoiceLineItems,
    #[sea_orm(has_many = "super::tickets::Entity")]
    Tickets,
}

impl Related<super::invoice_line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceLineItems.def()
    }
}

impl Related<super::tickets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
