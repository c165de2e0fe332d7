//! Migration to create the businesses table.
//!
//! This migration creates the business registry: one row per registered
//! tenant, carrying the trial window the synchronizer reconciles.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Businesses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Businesses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Businesses::BusinessName).text().not_null())
                    .col(ColumnDef::new(Businesses::OwnerFirstName).text().null())
                    .col(ColumnDef::new(Businesses::OwnerLastName).text().null())
                    .col(ColumnDef::new(Businesses::Email).text().not_null())
                    .col(ColumnDef::new(Businesses::Phone).text().null())
                    .col(
                        ColumnDef::new(Businesses::IsInTrial)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Businesses::TrialStartDate)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Businesses::TrialEndDate)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Businesses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Businesses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Email is the join key used by the businesses -> saas_clients pass.
        manager
            .create_index(
                Index::create()
                    .name("idx_businesses_email")
                    .table(Businesses::Table)
                    .col(Businesses::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_businesses_is_in_trial")
                    .table(Businesses::Table)
                    .col(Businesses::IsInTrial)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Businesses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Businesses {
    Table,
    Id,
    BusinessName,
    OwnerFirstName,
    OwnerLastName,
    Email,
    Phone,
    IsInTrial,
    TrialStartDate,
    TrialEndDate,
    CreatedAt,
    UpdatedAt,
}
