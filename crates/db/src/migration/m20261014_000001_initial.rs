//! Initial schema: parties, documents, and the balance ledger.
//!
//! Built with the schema builder so the same migration runs on PostgreSQL
//! and on the in-memory SQLite databases used by the tests.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Parties::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Parties::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Parties::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Parties::Name).string().not_null())
                    .col(ColumnDef::new(Parties::Email).string())
                    .col(ColumnDef::new(Parties::Phone).string())
                    .col(ColumnDef::new(Parties::Address).text())
                    .col(money(Parties::DepositBalance))
                    .col(money(Parties::CreditBalance))
                    .col(ColumnDef::new(Parties::Version).big_integer().not_null())
                    .col(timestamp(Parties::CreatedAt))
                    .col(timestamp(Parties::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Invoices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Invoices::CustomerType).string_len(16).not_null())
                    .col(ColumnDef::new(Invoices::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Invoices::VendorId).uuid().not_null())
                    .col(money(Invoices::Subtotal))
                    .col(
                        ColumnDef::new(Invoices::DiscountPercent)
                            .decimal_len(7, 4)
                            .not_null(),
                    )
                    .col(money(Invoices::DiscountAmount))
                    .col(money(Invoices::DepositUsed))
                    .col(money(Invoices::AgentCreditUsed))
                    .col(money(Invoices::VendorCost))
                    .col(money(Invoices::VendorBalanceDeducted))
                    .col(ColumnDef::new(Invoices::UseVendorBalance).string_len(16).not_null())
                    .col(money(Invoices::Total))
                    .col(ColumnDef::new(Invoices::PaymentMethod).string_len(16).not_null())
                    .col(ColumnDef::new(Invoices::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Invoices::IssuedBy).string().not_null())
                    .col(ColumnDef::new(Invoices::Notes).text())
                    .col(timestamp(Invoices::CreatedAt))
                    .col(timestamp(Invoices::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_customer")
                            .from(Invoices::Table, Invoices::CustomerId)
                            .to(Parties::Table, Parties::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_vendor")
                            .from(Invoices::Table, Invoices::VendorId)
                            .to(Parties::Table, Parties::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InvoiceLineItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvoiceLineItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InvoiceLineItems::InvoiceId).uuid().not_null())
                    .col(ColumnDef::new(InvoiceLineItems::Position).integer().not_null())
                    .col(ColumnDef::new(InvoiceLineItems::Description).text().not_null())
                    .col(ColumnDef::new(InvoiceLineItems::Quantity).integer().not_null())
                    .col(money(InvoiceLineItems::UnitPrice))
                    .col(money(InvoiceLineItems::LineTotal))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_line_items_invoice")
                            .from(InvoiceLineItems::Table, InvoiceLineItems::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tickets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tickets::CustomerType).string_len(16).not_null())
                    .col(ColumnDef::new(Tickets::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Tickets::VendorId).uuid().not_null())
                    .col(ColumnDef::new(Tickets::InvoiceId).uuid())
                    .col(ColumnDef::new(Tickets::PassengerName).string().not_null())
                    .col(ColumnDef::new(Tickets::Airline).string().not_null())
                    .col(ColumnDef::new(Tickets::Route).string().not_null())
                    .col(ColumnDef::new(Tickets::TravelDate).date().not_null())
                    .col(money(Tickets::FaceValue))
                    .col(money(Tickets::VendorPrice))
                    .col(money(Tickets::MiddleClassPrice))
                    .col(money(Tickets::DepositDeducted))
                    .col(money(Tickets::AgentCreditUsed))
                    .col(money(Tickets::VendorBalanceDeducted))
                    .col(ColumnDef::new(Tickets::UseVendorBalance).string_len(16).not_null())
                    .col(money(Tickets::Total))
                    .col(ColumnDef::new(Tickets::PaymentMethod).string_len(16).not_null())
                    .col(ColumnDef::new(Tickets::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Tickets::IssuedBy).string().not_null())
                    .col(timestamp(Tickets::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_customer")
                            .from(Tickets::Table, Tickets::CustomerId)
                            .to(Parties::Table, Parties::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_vendor")
                            .from(Tickets::Table, Tickets::VendorId)
                            .to(Parties::Table, Parties::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_invoice")
                            .from(Tickets::Table, Tickets::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::PartyId).uuid().not_null())
                    .col(
                        ColumnDef::new(LedgerTransactions::PartyKind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::BalanceKind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::EntryType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(money(LedgerTransactions::Amount))
                    .col(ColumnDef::new(LedgerTransactions::Description).text().not_null())
                    .col(money(LedgerTransactions::BalanceAfter))
                    .col(
                        ColumnDef::new(LedgerTransactions::Sequence)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::SourceKind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::SourceId).uuid())
                    .col(timestamp(LedgerTransactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_transactions_party")
                            .from(LedgerTransactions::Table, LedgerTransactions::PartyId)
                            .to(Parties::Table, Parties::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per party version: two writers can never both append
        // the same sequence number.
        manager
            .create_index(
                Index::create()
                    .name("uq_ledger_transactions_party_sequence")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::PartyId)
                    .col(LedgerTransactions::Sequence)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_transactions_created_at")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_created_at")
                    .table(Invoices::Table)
                    .col(Invoices::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_created_at")
                    .table(Tickets::Table)
                    .col(Tickets::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoice_line_items_invoice")
                    .table(InvoiceLineItems::Table)
                    .col(InvoiceLineItems::InvoiceId)
                    .col(InvoiceLineItems::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvoiceLineItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parties::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn money<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column).decimal_len(16, 2).not_null().to_owned()
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[derive(DeriveIden)]
enum Parties {
    Table,
    Id,
    Kind,
    Name,
    Email,
    Phone,
    Address,
    DepositBalance,
    CreditBalance,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Invoices {
    Table,
    Id,
    CustomerType,
    CustomerId,
    VendorId,
    Subtotal,
    DiscountPercent,
    DiscountAmount,
    DepositUsed,
    AgentCreditUsed,
    VendorCost,
    VendorBalanceDeducted,
    UseVendorBalance,
    Total,
    PaymentMethod,
    Status,
    IssuedBy,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InvoiceLineItems {
    Table,
    Id,
    InvoiceId,
    Position,
    Description,
    Quantity,
    UnitPrice,
    LineTotal,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    CustomerType,
    CustomerId,
    VendorId,
    InvoiceId,
    PassengerName,
    Airline,
    Route,
    TravelDate,
    FaceValue,
    VendorPrice,
    MiddleClassPrice,
    DepositDeducted,
    AgentCreditUsed,
    VendorBalanceDeducted,
    UseVendorBalance,
    Total,
    PaymentMethod,
    Status,
    IssuedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LedgerTransactions {
    Table,
    Id,
    PartyId,
    PartyKind,
    BalanceKind,
    EntryType,
    Amount,
    Description,
    BalanceAfter,
    Sequence,
    SourceKind,
    SourceId,
    CreatedAt,
}
