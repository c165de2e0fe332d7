//! Migration to create the subscriptions table.
//!
//! The subscription ledger is read-only input to the synchronizer; rows are
//! written by the billing side of the product. `client_id` carries the
//! business id, matching the billing system's convention.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscriptions::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Subscriptions::PlanId).text().null())
                    .col(
                        ColumnDef::new(Subscriptions::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::StartDate)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::EndDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::AutoRenew)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_client_id")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::ClientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_status")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    ClientId,
    PlanId,
    Status,
    StartDate,
    EndDate,
    AutoRenew,
    CreatedAt,
}
