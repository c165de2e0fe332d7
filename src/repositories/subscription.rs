//! # Subscription Repository
//!
//! Read-only query surface over the billing subscription ledger. The
//! synchronizer never writes subscription rows.

use crate::error::RepositoryError;
use crate::models::subscription::{
    self, Column as SubscriptionColumn, Entity as Subscription, Model as SubscriptionModel,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

/// Repository for Subscription database operations
pub struct SubscriptionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new SubscriptionRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// List all subscriptions with status "active", regardless of end date
    pub async fn list_active(&self) -> Result<Vec<SubscriptionModel>, RepositoryError> {
        let subscriptions = Subscription::find()
            .filter(SubscriptionColumn::Status.eq(subscription::STATUS_ACTIVE))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(subscriptions)
    }

    /// List subscriptions belonging to the given tenant
    pub async fn list_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<SubscriptionModel>, RepositoryError> {
        let subscriptions = Subscription::find()
            .filter(SubscriptionColumn::ClientId.eq(client_id))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(subscriptions)
    }

    /// Whether the tenant holds at least one subscription with status "active"
    pub async fn has_active_for_client(&self, client_id: Uuid) -> Result<bool, RepositoryError> {
        let found = Subscription::find()
            .filter(SubscriptionColumn::ClientId.eq(client_id))
            .filter(SubscriptionColumn::Status.eq(subscription::STATUS_ACTIVE))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(found.is_some())
    }
}
