//! Database seeder for Voyra development and testing.
//!
//! Seeds a handful of customers, agents and vendors with opening balances.
//! Balances go through the ledger store, so every seeded party starts with
//! a replayable history. Does nothing if any party already exists.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use voyra_core::party::{CreatePartyInput, PartyKind};
use voyra_db::PartyLedgerRepository;

/// Demo parties: kind, name, phone, opening deposit, opening credit (in cents).
const PARTIES: &[(PartyKind, &str, &str, i64, i64)] = &[
    (PartyKind::Customer, "Rahim Uddin", "+880 1711 000001", 50_000, 0),
    (PartyKind::Customer, "Nusrat Jahan", "+880 1711 000002", 0, 0),
    (PartyKind::Agent, "Hill Tracks Travel", "+880 1811 000003", 25_000, 500_000),
    (PartyKind::Agent, "Sundarbans Tours", "+880 1811 000004", 0, 200_000),
    (PartyKind::Vendor, "Sky Consolidators", "+880 1911 000005", 100_000, 300_000),
    (PartyKind::Vendor, "Sea Pearl Resort", "+880 1911 000006", 0, 150_000),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = voyra_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let repo = PartyLedgerRepository::new(db);
    if !repo.list_parties(None).await?.is_empty() {
        println!("Parties already exist, skipping...");
        return Ok(());
    }

    println!("Seeding parties...");
    for &(kind, name, phone, deposit_cents, credit_cents) in PARTIES {
        let party = repo
            .create_party(CreatePartyInput {
                kind,
                name: name.to_string(),
                email: None,
                phone: Some(phone.to_string()),
                address: Some("Dhaka".to_string()),
                opening_deposit: Decimal::new(deposit_cents, 2),
                opening_credit: Decimal::new(credit_cents, 2),
            })
            .await
            .with_context(|| format!("Failed to seed {name}"))?;
        println!(
            "  Created {kind} {name}: deposit {}, credit {}",
            party.deposit_balance, party.credit_balance
        );
    }

    println!("Seeding complete!");
    Ok(())
}
