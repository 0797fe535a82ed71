//! `SeaORM` Entity for tickets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{
    CustomerType, DocumentStatus, PaymentMethod, VendorBalanceChoice,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_type: CustomerType,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub invoice_id: Option<Uuid>,
    pub passenger_name: String,
    pub airline: String,
    pub route: String,
    pub travel_date: Date,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub face_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub vendor_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub middle_class_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub deposit_deducted: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub agent_credit_used: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub vendor_balance_deducted: Decimal,
    pub use_vendor_balance: VendorBalanceChoice,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub status: DocumentStatus,
    pub issued_by: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
