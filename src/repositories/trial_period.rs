//! # Trial Period Repository
//!
//! Query surface over the trial-period configurations managed from the admin
//! console. The synchronizer only needs the single active period.

use crate::error::RepositoryError;
use crate::models::trial_period::{
    ActiveModel as TrialPeriodActiveModel, Column as TrialPeriodColumn, Entity as TrialPeriod,
    Model as TrialPeriodModel,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

/// Repository for trial period configuration operations
pub struct TrialPeriodRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TrialPeriodRepository<'a> {
    /// Create a new TrialPeriodRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// The trial period applied to new registrations, if one is configured
    pub async fn active_period(&self) -> Result<Option<TrialPeriodModel>, RepositoryError> {
        let period = TrialPeriod::find()
            .filter(TrialPeriodColumn::IsActive.eq(true))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(period)
    }

    /// List all configured trial periods
    pub async fn list_all(&self) -> Result<Vec<TrialPeriodModel>, RepositoryError> {
        let periods = TrialPeriod::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(periods)
    }

    /// Create a trial period configuration
    pub async fn create_period(
        &self,
        name: &str,
        days: i32,
        minutes: i32,
        is_active: bool,
        description: Option<String>,
    ) -> Result<TrialPeriodModel, RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Trial period name cannot be empty",
            ));
        }
        if days < 0 || minutes < 0 {
            return Err(RepositoryError::validation_error(
                "Trial period duration cannot be negative",
            ));
        }

        let now = Utc::now();

        let period = TrialPeriodActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            days: Set(days),
            minutes: Set(minutes),
            is_active: Set(is_active),
            description: Set(description),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = period
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }
}
