//! Migration to create the saas_clients table.
//!
//! This migration creates the SaaS client registry, the admin-console view of
//! a business. The business link is nullable: clients imported before the
//! registry existed carry no back-reference, and the synchronizer must treat
//! that as a skip rather than an error.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SaasClients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SaasClients::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SaasClients::BusinessId).uuid().null())
                    .col(ColumnDef::new(SaasClients::BusinessName).text().not_null())
                    .col(ColumnDef::new(SaasClients::ContactName).text().not_null())
                    .col(ColumnDef::new(SaasClients::Email).text().not_null())
                    .col(ColumnDef::new(SaasClients::Phone).text().null())
                    .col(
                        ColumnDef::new(SaasClients::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(SaasClients::Notes).text().null())
                    .col(
                        ColumnDef::new(SaasClients::IsInTrial)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SaasClients::TrialStartDate)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SaasClients::TrialEndDate)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(SaasClients::TrialInfo).json_binary().null())
                    .col(
                        ColumnDef::new(SaasClients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SaasClients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saas_clients_business_id")
                            .from(SaasClients::Table, SaasClients::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // The two join keys used by the synchronizer.
        manager
            .create_index(
                Index::create()
                    .name("idx_saas_clients_business_id")
                    .table(SaasClients::Table)
                    .col(SaasClients::BusinessId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_saas_clients_email")
                    .table(SaasClients::Table)
                    .col(SaasClients::Email)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_saas_clients_is_in_trial")
                    .table(SaasClients::Table)
                    .col(SaasClients::IsInTrial)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SaasClients::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SaasClients {
    Table,
    Id,
    BusinessId,
    BusinessName,
    ContactName,
    Email,
    Phone,
    Status,
    Notes,
    IsInTrial,
    TrialStartDate,
    TrialEndDate,
    TrialInfo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Businesses {
    Table,
    Id,
}
