//! Shared fixtures for repository integration tests.
//!
//! Every test gets its own in-memory SQLite database, migrated with the
//! real migrator. The pool is pinned to one connection: each connection to
//! `sqlite::memory:` opens a separate empty database.

#![allow(dead_code)]

use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use voyra_core::issuance::{InvoiceDraft, PaymentMethod};
use voyra_core::party::{CreatePartyInput, Party, PartyKind};
use voyra_core::settlement::{CustomerType, LineItem, VendorBalanceChoice};
use voyra_db::PartyLedgerRepository;
use voyra_db::migration::{Migrator, MigratorTrait};

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("in-memory sqlite should connect");
    Migrator::up(&db, None)
        .await
        .expect("migrations should apply");
    db
}

pub async fn create_party(
    db: &DatabaseConnection,
    kind: PartyKind,
    name: &str,
    opening_deposit: Decimal,
    opening_credit: Decimal,
) -> Party {
    PartyLedgerRepository::new(db.clone())
        .create_party(CreatePartyInput {
            kind,
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            opening_deposit,
            opening_credit,
        })
        .await
        .expect("party should be created")
}

pub fn invoice_draft(customer: &Party, vendor: &Party, unit_price: Decimal) -> InvoiceDraft {
    InvoiceDraft {
        customer_type: match customer.kind {
            PartyKind::Agent => CustomerType::Agent,
            _ => CustomerType::Customer,
        },
        customer_id: customer.id,
        vendor_id: vendor.id,
        line_items: vec![LineItem {
            description: "Cox's Bazar package".to_string(),
            quantity: 1,
            unit_price,
        }],
        discount_percent: Decimal::ZERO,
        use_deposit: false,
        use_agent_credit: false,
        vendor_cost: Decimal::ZERO,
        use_vendor_balance: VendorBalanceChoice::None,
        payment_method: PaymentMethod::Cash,
        issued_by: "front-desk".to_string(),
        notes: None,
    }
}
