//! Initial schema for the sales desk.
//!
//! - `sites`: quarry sites and their per-unit fee schedule
//! - `operators`: clerks recording at the desk
//! - `products`, `brokers`: reference data for sales
//! - `sales`, `expenses`, `fuel_usages`, `bankings`, `prepayments`: raw records
//!
//! Money columns hold integer minor units (`*_minor`), quantity columns hold
//! integer thousandths of a unit (`*_milli`).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Sites {
    Table,
    Id,
    Name,
    LoaderFeeMinor,
    LandRateFeeMinor,
    RejectsFeeMinor,
}

#[derive(Iden)]
enum Operators {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Brokers {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Sales {
    Table,
    Id,
    Date,
    SiteId,
    OperatorId,
    VehicleRegistration,
    ProductId,
    QuantityMilli,
    PricePerUnitMinor,
    CommissionPerUnitMinor,
    BrokerId,
    Client,
    Reference,
    PaymentStatus,
    PaymentReceivedDate,
    IncludeLandRate,
    Active,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    Date,
    SiteId,
    OperatorId,
    Item,
    AmountMinor,
    Active,
}

#[derive(Iden)]
enum FuelUsages {
    Table,
    Id,
    Date,
    SiteId,
    OldStockMilli,
    NewStockMilli,
    MachineConsumptionMilli,
    LoaderConsumptionMilli,
    BalanceMilli,
    Active,
}

#[derive(Iden)]
enum Bankings {
    Table,
    Id,
    Date,
    SiteId,
    OperatorId,
    Item,
    AmountBankedMinor,
    Reference,
    Active,
}

#[derive(Iden)]
enum Prepayments {
    Table,
    Id,
    Date,
    SiteId,
    OperatorId,
    Client,
    VehicleRegistration,
    ProductId,
    AmountPaidMinor,
    Reference,
    Active,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Reference data
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Sites::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sites::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sites::Name).string().not_null())
                    .col(ColumnDef::new(Sites::LoaderFeeMinor).big_integer())
                    .col(ColumnDef::new(Sites::LandRateFeeMinor).big_integer())
                    .col(ColumnDef::new(Sites::RejectsFeeMinor).big_integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Operators::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Operators::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Operators::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Brokers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Brokers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Brokers::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Sales
        // ───────────────────────────────────────────────────────────────────
        // Product and broker are plain references: a sale outlives a deleted
        // product and is reported with a placeholder name.
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sales::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sales::Date).date().not_null())
                    .col(ColumnDef::new(Sales::SiteId).uuid().not_null())
                    .col(ColumnDef::new(Sales::OperatorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Sales::VehicleRegistration)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Sales::ProductId).uuid())
                    .col(ColumnDef::new(Sales::QuantityMilli).big_integer().not_null())
                    .col(
                        ColumnDef::new(Sales::PricePerUnitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sales::CommissionPerUnitMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Sales::BrokerId).uuid())
                    .col(ColumnDef::new(Sales::Client).string())
                    .col(ColumnDef::new(Sales::Reference).string())
                    .col(
                        ColumnDef::new(Sales::PaymentStatus)
                            .string()
                            .not_null()
                            .default("unpaid"),
                    )
                    .col(ColumnDef::new(Sales::PaymentReceivedDate).date())
                    .col(
                        ColumnDef::new(Sales::IncludeLandRate)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Sales::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sales-site_id")
                            .from(Sales::Table, Sales::SiteId)
                            .to(Sites::Table, Sites::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sales-operator_id")
                            .from(Sales::Table, Sales::OperatorId)
                            .to(Operators::Table, Operators::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sales-site_id-date")
                    .table(Sales::Table)
                    .col(Sales::SiteId)
                    .col(Sales::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sales-site_id-payment_received_date")
                    .table(Sales::Table)
                    .col(Sales::SiteId)
                    .col(Sales::PaymentReceivedDate)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Manual expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(ColumnDef::new(Expenses::SiteId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::OperatorId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::Item).string().not_null())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Expenses::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-site_id")
                            .from(Expenses::Table, Expenses::SiteId)
                            .to(Sites::Table, Sites::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-site_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::SiteId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Fuel usage
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FuelUsages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FuelUsages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(FuelUsages::Date).date().not_null())
                    .col(ColumnDef::new(FuelUsages::SiteId).uuid().not_null())
                    .col(
                        ColumnDef::new(FuelUsages::OldStockMilli)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FuelUsages::NewStockMilli)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FuelUsages::MachineConsumptionMilli)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FuelUsages::LoaderConsumptionMilli)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FuelUsages::BalanceMilli).big_integer().not_null())
                    .col(
                        ColumnDef::new(FuelUsages::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fuel_usages-site_id")
                            .from(FuelUsages::Table, FuelUsages::SiteId)
                            .to(Sites::Table, Sites::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Bankings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Bankings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bankings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bankings::Date).date().not_null())
                    .col(ColumnDef::new(Bankings::SiteId).uuid().not_null())
                    .col(ColumnDef::new(Bankings::OperatorId).uuid().not_null())
                    .col(ColumnDef::new(Bankings::Item).string().not_null())
                    .col(
                        ColumnDef::new(Bankings::AmountBankedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bankings::Reference).string())
                    .col(
                        ColumnDef::new(Bankings::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bankings-site_id")
                            .from(Bankings::Table, Bankings::SiteId)
                            .to(Sites::Table, Sites::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Prepayments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Prepayments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Prepayments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Prepayments::Date).date().not_null())
                    .col(ColumnDef::new(Prepayments::SiteId).uuid().not_null())
                    .col(ColumnDef::new(Prepayments::OperatorId).uuid().not_null())
                    .col(ColumnDef::new(Prepayments::Client).string().not_null())
                    .col(ColumnDef::new(Prepayments::VehicleRegistration).string())
                    .col(ColumnDef::new(Prepayments::ProductId).uuid())
                    .col(
                        ColumnDef::new(Prepayments::AmountPaidMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Prepayments::Reference).string())
                    .col(
                        ColumnDef::new(Prepayments::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-prepayments-site_id")
                            .from(Prepayments::Table, Prepayments::SiteId)
                            .to(Sites::Table, Sites::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Prepayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bankings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FuelUsages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Brokers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Operators::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sites::Table).to_owned())
            .await?;

        Ok(())
    }
}
