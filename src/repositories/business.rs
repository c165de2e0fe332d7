//! # Business Repository
//!
//! This module contains the repository implementation for Business entities,
//! providing CRUD operations for the tenant registry.

use crate::error::RepositoryError;
use crate::models::business::{
    ActiveModel as BusinessActiveModel, Column as BusinessColumn, Entity as Business,
    Model as BusinessModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

/// Request data for registering a new business
#[derive(Debug, Clone)]
pub struct CreateBusinessRequest {
    /// Display name for the business
    pub business_name: String,
    /// Owner first name
    pub owner_first_name: Option<String>,
    /// Owner last name
    pub owner_last_name: Option<String>,
    /// Contact email (unique)
    pub email: String,
    /// Contact phone number
    pub phone: Option<String>,
}

/// Repository for Business database operations
pub struct BusinessRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BusinessRepository<'a> {
    /// Create a new BusinessRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a new business. New registrations start outside any trial
    /// window; the trial is applied when the SaaS client is provisioned.
    pub async fn create_business(
        &self,
        request: CreateBusinessRequest,
    ) -> Result<BusinessModel, RepositoryError> {
        validate_business_name(&request.business_name)?;
        validate_email(&request.email)?;

        let now = Utc::now();

        let business = BusinessActiveModel {
            id: Set(Uuid::new_v4()),
            business_name: Set(request.business_name),
            owner_first_name: Set(request.owner_first_name),
            owner_last_name: Set(request.owner_last_name),
            email: Set(request.email),
            phone: Set(request.phone),
            is_in_trial: Set(false),
            trial_start_date: Set(None),
            trial_end_date: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = business
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get business by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<BusinessModel>, RepositoryError> {
        let business = Business::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(business)
    }

    /// Find a business by its contact email
    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<BusinessModel>, RepositoryError> {
        let business = Business::find()
            .filter(BusinessColumn::Email.eq(email))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(business)
    }

    /// List all businesses
    pub async fn list_all(&self) -> Result<Vec<BusinessModel>, RepositoryError> {
        let businesses = Business::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(businesses)
    }

    /// List businesses currently flagged as being in a trial
    pub async fn list_in_trial(&self) -> Result<Vec<BusinessModel>, RepositoryError> {
        let businesses = Business::find()
            .filter(BusinessColumn::IsInTrial.eq(true))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(businesses)
    }

    /// Check if a business exists
    pub async fn exists(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.get_by_id(id).await?.is_some())
    }

    /// Get business count
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let count = Business::find()
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(count)
    }
}

/// Validate business name according to business rules
pub(crate) fn validate_business_name(name: &str) -> Result<(), RepositoryError> {
    if name.trim().is_empty() {
        return Err(RepositoryError::validation_error(
            "Business name cannot be empty",
        ));
    }

    if name.len() > 255 {
        return Err(RepositoryError::validation_error(
            "Business name cannot exceed 255 characters",
        ));
    }

    Ok(())
}

/// Validate a contact email; a loose shape check, delivery is not our problem
pub(crate) fn validate_email(email: &str) -> Result<(), RepositoryError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(RepositoryError::validation_error("Email cannot be empty"));
    }

    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(RepositoryError::validation_error(
            "Email must contain an '@'",
        ));
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(RepositoryError::validation_error("Email is malformed"));
    }

    Ok(())
}
