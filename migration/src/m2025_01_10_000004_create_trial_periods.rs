//! Migration to create the trial_periods table.
//!
//! Trial periods are configured from the admin console; at most one is
//! active at a time and applies to newly registered tenants.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrialPeriods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrialPeriods::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TrialPeriods::Name).text().not_null())
                    .col(ColumnDef::new(TrialPeriods::Days).integer().not_null())
                    .col(
                        ColumnDef::new(TrialPeriods::Minutes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TrialPeriods::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(TrialPeriods::Description).text().null())
                    .col(
                        ColumnDef::new(TrialPeriods::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TrialPeriods::UpdatedAt)
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
                    .name("idx_trial_periods_is_active")
                    .table(TrialPeriods::Table)
                    .col(TrialPeriods::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrialPeriods::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrialPeriods {
    Table,
    Id,
    Name,
    Days,
    Minutes,
    IsActive,
    Description,
    CreatedAt,
    UpdatedAt,
}
