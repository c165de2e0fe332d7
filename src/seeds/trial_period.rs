//! Seed for the default trial period configuration.

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::error::RepositoryError;
use crate::repositories::TrialPeriodRepository;
use crate::trial_sync::DEFAULT_TRIAL_DAYS;

/// Ensure an active trial period exists, creating the standard 30-day one
/// when the table holds none.
pub async fn seed_default_trial_period(db: &DatabaseConnection) -> Result<(), RepositoryError> {
    let repo = TrialPeriodRepository::new(db);

    if let Some(existing) = repo.active_period().await? {
        info!(name = %existing.name, "Active trial period already present, skipping seed");
        return Ok(());
    }

    let period = repo
        .create_period(
            "Standard 30-day trial",
            DEFAULT_TRIAL_DAYS as i32,
            0,
            true,
            Some("Default trial applied to newly registered businesses".to_string()),
        )
        .await?;

    info!(id = %period.id, "Seeded default trial period");
    Ok(())
}
