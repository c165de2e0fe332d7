//! # SaaS Client Repository
//!
//! Repository for the admin-console client registry, including the enriched
//! trial listing and the trial conversion statistics the console displays.

use std::collections::HashMap;

use crate::error::RepositoryError;
use crate::models::business::{Column as BusinessColumn, Entity as Business};
use crate::models::saas_client::{
    ActiveModel as SaasClientActiveModel, Column as SaasClientColumn, Entity as SaasClient,
    Model as SaasClientModel,
};
use crate::models::subscription::{self, Column as SubscriptionColumn, Entity as Subscription};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

/// Trailing window used for the conversion-rate statistic.
const CONVERSION_WINDOW_MILLIS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Request data for creating a new SaaS client
#[derive(Debug, Clone)]
pub struct CreateSaasClientRequest {
    pub business_id: Option<Uuid>,
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub is_in_trial: bool,
    pub trial_start_date: Option<i64>,
    pub trial_end_date: Option<i64>,
    pub trial_info: Option<JsonValue>,
}

/// Trial client enriched with data from the business registry.
///
/// When a matching business exists (joined by email), its display fields win
/// over the possibly stale client copy.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrialClientView {
    pub id: Uuid,
    pub business_id: Option<Uuid>,
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub trial_start_date: Option<i64>,
    pub trial_end_date: Option<i64>,
}

/// Trial to subscription conversion statistics over the trailing 30 days
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversionRate {
    /// Conversion rate in percent, rounded to two decimals
    pub rate: f64,
    /// Clients whose trial ended and who hold an active subscription
    pub converted_clients: u64,
    /// Clients whose trial ended within the window
    pub total_trial_ended: u64,
}

/// Repository for SaaS client database operations
pub struct SaasClientRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SaasClientRepository<'a> {
    /// Create a new SaasClientRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new SaaS client
    pub async fn create_client(
        &self,
        request: CreateSaasClientRequest,
    ) -> Result<SaasClientModel, RepositoryError> {
        super::business::validate_email(&request.email)?;

        let now = Utc::now();

        let client = SaasClientActiveModel {
            id: Set(Uuid::new_v4()),
            business_id: Set(request.business_id),
            business_name: Set(request.business_name),
            contact_name: Set(request.contact_name),
            email: Set(request.email),
            phone: Set(request.phone),
            status: Set(request.status),
            notes: Set(request.notes),
            is_in_trial: Set(request.is_in_trial),
            trial_start_date: Set(request.trial_start_date),
            trial_end_date: Set(request.trial_end_date),
            trial_info: Set(request.trial_info),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = client
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get client by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<SaasClientModel>, RepositoryError> {
        let client = SaasClient::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(client)
    }

    /// Find the client mirroring the given business
    pub async fn find_by_business_id(
        &self,
        business_id: Uuid,
    ) -> Result<Option<SaasClientModel>, RepositoryError> {
        let client = SaasClient::find()
            .filter(SaasClientColumn::BusinessId.eq(business_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(client)
    }

    /// Find a client by email
    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<SaasClientModel>, RepositoryError> {
        let client = SaasClient::find()
            .filter(SaasClientColumn::Email.eq(email))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(client)
    }

    /// List all clients
    pub async fn list_all(&self) -> Result<Vec<SaasClientModel>, RepositoryError> {
        let clients = SaasClient::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(clients)
    }

    /// List clients currently flagged as being in a trial
    pub async fn list_in_trial(&self) -> Result<Vec<SaasClientModel>, RepositoryError> {
        let clients = SaasClient::find()
            .filter(SaasClientColumn::IsInTrial.eq(true))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(clients)
    }

    /// List trial clients enriched with business registry data.
    ///
    /// The join runs over email because legacy clients may lack a business
    /// back-reference; where a business matches, its fields take precedence.
    pub async fn trial_clients_with_business_data(
        &self,
    ) -> Result<Vec<TrialClientView>, RepositoryError> {
        let clients = self.list_in_trial().await?;
        if clients.is_empty() {
            return Ok(Vec::new());
        }

        let emails: Vec<String> = clients.iter().map(|c| c.email.clone()).collect();
        let businesses = Business::find()
            .filter(BusinessColumn::Email.is_in(emails))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let by_email: HashMap<String, crate::models::business::Model> = businesses
            .into_iter()
            .map(|b| (b.email.clone(), b))
            .collect();

        let views = clients
            .into_iter()
            .map(|client| match by_email.get(&client.email) {
                Some(business) => TrialClientView {
                    id: client.id,
                    business_id: client.business_id.or(Some(business.id)),
                    business_name: business.business_name.clone(),
                    contact_name: business.contact_name(),
                    email: client.email,
                    trial_start_date: client.trial_start_date,
                    trial_end_date: client.trial_end_date,
                },
                None => TrialClientView {
                    id: client.id,
                    business_id: client.business_id,
                    business_name: client.business_name,
                    contact_name: client.contact_name,
                    email: client.email,
                    trial_start_date: client.trial_start_date,
                    trial_end_date: client.trial_end_date,
                },
            })
            .collect();

        Ok(views)
    }

    /// Trial to subscription conversion rate over the trailing 30 days.
    ///
    /// Counts clients whose trial ended inside the window and, of those, the
    /// fraction holding an active subscription keyed by their business id.
    pub async fn conversion_rate(
        &self,
        now_millis: i64,
    ) -> Result<ConversionRate, RepositoryError> {
        let window_start = now_millis - CONVERSION_WINDOW_MILLIS;

        let ended_trial_clients = SaasClient::find()
            .filter(SaasClientColumn::IsInTrial.eq(false))
            .filter(SaasClientColumn::TrialEndDate.gte(window_start))
            .filter(SaasClientColumn::TrialEndDate.lte(now_millis))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let total_trial_ended = ended_trial_clients.len() as u64;
        if total_trial_ended == 0 {
            return Ok(ConversionRate {
                rate: 0.0,
                converted_clients: 0,
                total_trial_ended: 0,
            });
        }

        let mut converted_clients = 0u64;
        for client in &ended_trial_clients {
            let Some(business_id) = client.business_id else {
                continue;
            };

            let has_active = Subscription::find()
                .filter(SubscriptionColumn::ClientId.eq(business_id))
                .filter(SubscriptionColumn::Status.eq(subscription::STATUS_ACTIVE))
                .one(self.db)
                .await
                .map_err(RepositoryError::database_error)?
                .is_some();

            if has_active {
                converted_clients += 1;
            }
        }

        let rate = (converted_clients as f64 / total_trial_ended as f64) * 100.0;

        Ok(ConversionRate {
            rate: (rate * 100.0).round() / 100.0,
            converted_clients,
            total_trial_ended,
        })
    }
}
