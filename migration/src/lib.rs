//! Database migrations for the PayeSmart admin sync service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_01_10_000001_create_businesses;
mod m2025_01_10_000002_create_saas_clients;
mod m2025_01_10_000003_create_subscriptions;
mod m2025_01_10_000004_create_trial_periods;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_10_000001_create_businesses::Migration),
            Box::new(m2025_01_10_000002_create_saas_clients::Migration),
            Box::new(m2025_01_10_000003_create_subscriptions::Migration),
            Box::new(m2025_01_10_000004_create_trial_periods::Migration),
        ]
    }
}
