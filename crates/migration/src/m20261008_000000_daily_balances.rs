//! Daily balance ledger: one closing balance per site per calendar day.
//!
//! The composite primary key is the conflict target of the engine's upsert.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum DailyBalances {
    Table,
    SiteId,
    Date,
    ClosingBalanceMinor,
}

#[derive(Iden)]
enum Sites {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyBalances::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DailyBalances::SiteId).uuid().not_null())
                    .col(ColumnDef::new(DailyBalances::Date).date().not_null())
                    .col(
                        ColumnDef::new(DailyBalances::ClosingBalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(DailyBalances::SiteId)
                            .col(DailyBalances::Date),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-daily_balances-site_id")
                            .from(DailyBalances::Table, DailyBalances::SiteId)
                            .to(Sites::Table, Sites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyBalances::Table).to_owned())
            .await?;

        Ok(())
    }
}
