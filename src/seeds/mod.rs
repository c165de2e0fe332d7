//! # Database Seeding
//!
//! Startup seeding for reference data. Seeds are idempotent and gated by
//! configuration, so repeated boots never duplicate rows.

mod trial_period;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::AppConfig;
use crate::error::RepositoryError;

/// Run all enabled seeds against the database.
pub async fn run_seeds(config: &AppConfig, db: &DatabaseConnection) -> Result<(), RepositoryError> {
    if config.seed_trial_period {
        trial_period::seed_default_trial_period(db).await?;
    } else {
        info!("Trial period seeding disabled by configuration");
    }
    Ok(())
}
