//! Trial-status synchronizer
//!
//! Reconciles trial-related fields between the business registry and the
//! SaaS client registry, and clears trial status for tenants holding an
//! active paid subscription.
//!
//! Each pass walks one source table and applies row-level corrections; a
//! single bad record never aborts a pass. Every per-record decision is
//! recorded as a tagged [`RecordOutcome`] so callers can branch on the
//! failure categories instead of parsing a summary string. Corrections that
//! touch both registries for one tenant run inside a single transaction, so
//! a tenant is never observed with half a subscription override applied.
//!
//! When both registries already flag a trial, the client registry is
//! authoritative: the first pass mirrors its window onto the business, and
//! the reverse pass never touches a client that is already in trial.

use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::business::Entity as Business;
use crate::models::saas_client::TrialInfo;
use crate::repositories::{
    BusinessRepository, CreateSaasClientRequest, SaasClientRepository, SubscriptionRepository,
    TrialPeriodRepository,
};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Trial window applied when no active trial period is configured.
pub const DEFAULT_TRIAL_DAYS: i64 = 30;

/// Fallback window used when re-enabling a trial flag on a record whose own
/// window is missing.
pub const REVERSE_SYNC_FALLBACK_DAYS: i64 = 15;

/// Errors that abort a synchronizer operation outright. Per-record problems
/// are reported as [`RecordOutcome`]s instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("business {0} not found")]
    BusinessNotFound(Uuid),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}

/// Reason a record was left untouched by a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// SaaS client carries no business back-reference
    MissingBusinessId,
    /// Business carries no usable email, so the client lookup is impossible
    MissingEmail,
    /// Referenced business row does not exist
    BusinessNotFound,
    /// Active subscription already ended, so trial status is untouched
    SubscriptionExpired,
    /// Both records already agree, nothing to write
    AlreadyConsistent,
}

/// Outcome of reconciling a single record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// An existing record was corrected
    Updated { id: Uuid },
    /// A missing mirror record was created
    Created { id: Uuid },
    /// The record was deliberately left alone
    Skipped { id: Uuid, reason: SkipReason },
    /// The write for this record failed; the pass continued
    Failed { id: Uuid, message: String },
}

/// Per-record outcomes of one reconciliation pass, with derived counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PassReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl PassReport {
    fn record(&mut self, outcome: RecordOutcome) {
        self.outcomes.push(outcome);
    }

    /// Number of records corrected in place
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RecordOutcome::Updated { .. }))
            .count()
    }

    /// Number of mirror records created
    pub fn created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RecordOutcome::Created { .. }))
            .count()
    }

    /// Number of per-record failures
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RecordOutcome::Failed { .. }))
            .count()
    }

    /// Number of records skipped for the given reason
    pub fn skipped_with(&self, reason: SkipReason) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RecordOutcome::Skipped { reason: r, .. } if *r == reason))
            .count()
    }
}

/// Structured result of a full synchronization run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SyncReport {
    /// Pass 1: SaaS clients in trial mirrored onto their businesses
    pub clients_to_businesses: PassReport,
    /// Pass 2: businesses in trial mirrored onto (or created as) SaaS clients
    pub businesses_to_clients: PassReport,
    /// Pass 3: trial flags cleared for tenants with a current subscription
    pub subscription_overrides: PassReport,
}

impl SyncReport {
    /// Total per-record failures across all passes
    pub fn total_failed(&self) -> usize {
        self.clients_to_businesses.failed()
            + self.businesses_to_clients.failed()
            + self.subscription_overrides.failed()
    }

    /// One-line human-readable summary for the admin console
    pub fn summary(&self) -> String {
        format!(
            "{} businesses synchronized from clients. {} clients created, {} clients updated from businesses. {} tenants with active subscriptions corrected. {} failures in total.",
            self.clients_to_businesses.updated(),
            self.businesses_to_clients.created(),
            self.businesses_to_clients.updated(),
            self.subscription_overrides.updated(),
            self.total_failed(),
        )
    }
}

/// Result of provisioning a SaaS client for a newly registered business
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A client already references this business; nothing was created
    AlreadyLinked { client_id: Uuid },
    /// A mirrored client was created with a fresh trial window
    Created { client_id: Uuid },
}

/// Result of the single-tenant subscription check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionCheck {
    /// The tenant holds no subscription with status "active"
    NoActiveSubscription,
    /// Trial flags were cleared on the business and its mirrored client
    TrialCleared,
}

/// Synchronizer reconciling trial status across the two registries
pub struct TrialSynchronizer<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TrialSynchronizer<'a> {
    /// Create a synchronizer over the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Provision the SaaS client mirroring a newly registered business.
    ///
    /// Invoked by the post-registration hook. Applies the configured active
    /// trial period, or the 30-day default when none is configured.
    #[instrument(skip(self))]
    pub async fn provision_client_for_business(
        &self,
        business_id: Uuid,
    ) -> Result<ProvisionOutcome, SyncError> {
        let clients = SaasClientRepository::new(self.db);

        if let Some(existing) = clients.find_by_business_id(business_id).await? {
            info!(%business_id, client_id = %existing.id, "SaaS client already provisioned");
            return Ok(ProvisionOutcome::AlreadyLinked {
                client_id: existing.id,
            });
        }

        let business = BusinessRepository::new(self.db)
            .get_by_id(business_id)
            .await?
            .ok_or(SyncError::BusinessNotFound(business_id))?;

        let active_period = TrialPeriodRepository::new(self.db).active_period().await?;

        let now = Utc::now().timestamp_millis();
        let (trial_end, trial_info) = match &active_period {
            Some(period) => {
                info!(
                    period = %period.name,
                    days = period.days,
                    minutes = period.minutes,
                    "Applying configured trial period"
                );
                let end = now + period.duration_millis();
                let info = TrialInfo {
                    trial_period_id: period.id.to_string(),
                    trial_period_name: period.name.clone(),
                    duration_days: period.days,
                    duration_minutes: period.minutes,
                    formatted_end_date: format_date(end),
                };
                (end, info)
            }
            None => {
                info!("No active trial period configured, applying the 30-day default");
                let end = now + DEFAULT_TRIAL_DAYS * DAY_MILLIS;
                let info = TrialInfo {
                    trial_period_id: "default".to_string(),
                    trial_period_name: "Standard 30-day trial".to_string(),
                    duration_days: DEFAULT_TRIAL_DAYS as i32,
                    duration_minutes: 0,
                    formatted_end_date: format_date(end),
                };
                (end, info)
            }
        };

        let client = clients
            .create_client(CreateSaasClientRequest {
                business_id: Some(business.id),
                business_name: business.business_name.clone(),
                contact_name: business.contact_name(),
                email: business.email.clone(),
                phone: business.phone.clone(),
                status: "active".to_string(),
                notes: Some("Client created automatically at registration".to_string()),
                is_in_trial: true,
                trial_start_date: Some(now),
                trial_end_date: Some(trial_end),
                trial_info: Some(serde_json::to_value(&trial_info).unwrap_or_default()),
            })
            .await?;

        counter!("payesmart_clients_provisioned_total").increment(1);
        info!(%business_id, client_id = %client.id, "SaaS client provisioned");

        Ok(ProvisionOutcome::Created {
            client_id: client.id,
        })
    }

    /// Run the full bidirectional synchronization: clients to businesses,
    /// businesses to clients, then the subscription override pass.
    #[instrument(skip(self))]
    pub async fn synchronize_trial_status(&self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport {
            clients_to_businesses: self.sync_clients_to_businesses().await?,
            businesses_to_clients: self.sync_businesses_to_clients().await?,
            ..Default::default()
        };
        report.subscription_overrides = self.clear_trials_for_active_subscriptions().await?;

        info!(
            updated = report.clients_to_businesses.updated(),
            created = report.businesses_to_clients.created(),
            corrected = report.subscription_overrides.updated(),
            failed = report.total_failed(),
            "Trial-status synchronization finished"
        );

        Ok(report)
    }

    /// Pass 1: every SaaS client flagged in trial pushes its trial window
    /// onto the business it references.
    async fn sync_clients_to_businesses(&self) -> Result<PassReport, SyncError> {
        let clients = SaasClientRepository::new(self.db).list_in_trial().await?;
        info!(count = clients.len(), "Clients in trial found in the client registry");

        let mut report = PassReport::default();
        let now = Utc::now().timestamp_millis();

        for client in clients {
            let Some(business_id) = client.business_id else {
                warn!(client_id = %client.id, email = %client.email, "Client has no business link");
                report.record(RecordOutcome::Skipped {
                    id: client.id,
                    reason: SkipReason::MissingBusinessId,
                });
                continue;
            };

            let business = match Business::find_by_id(business_id).one(self.db).await {
                Ok(Some(business)) => business,
                Ok(None) => {
                    warn!(%business_id, "Business referenced by client does not exist");
                    report.record(RecordOutcome::Failed {
                        id: client.id,
                        message: format!("business {} not found", business_id),
                    });
                    continue;
                }
                Err(err) => {
                    report.record(RecordOutcome::Failed {
                        id: client.id,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            let start = client.trial_start_date.unwrap_or(now);
            let end = client
                .trial_end_date
                .unwrap_or(now + REVERSE_SYNC_FALLBACK_DAYS * DAY_MILLIS);
            // A client without its own window gets the fallback written back;
            // otherwise every run derives a fresh window from `now` and the
            // business row never settles.
            let persist_client_window =
                client.trial_start_date.is_none() || client.trial_end_date.is_none();

            if !persist_client_window
                && business.is_in_trial
                && business.trial_start_date == Some(start)
                && business.trial_end_date == Some(end)
            {
                report.record(RecordOutcome::Skipped {
                    id: business.id,
                    reason: SkipReason::AlreadyConsistent,
                });
                continue;
            }

            let business_id = business.id;
            match self
                .mirror_window_onto_business(client, persist_client_window, business, start, end)
                .await
            {
                Ok(()) => {
                    counter!("payesmart_sync_businesses_updated_total").increment(1);
                    report.record(RecordOutcome::Updated { id: business_id });
                }
                Err(err) => {
                    warn!(%business_id, error = %err, "Failed to mirror trial window onto business");
                    report.record(RecordOutcome::Failed {
                        id: business_id,
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Pass 2: every business flagged in trial gets a SaaS client, created if
    /// missing (email join) or re-flagged if its trial was turned off.
    async fn sync_businesses_to_clients(&self) -> Result<PassReport, SyncError> {
        let businesses = BusinessRepository::new(self.db).list_in_trial().await?;
        info!(count = businesses.len(), "Businesses in trial found in the business registry");

        let clients = SaasClientRepository::new(self.db);
        let mut report = PassReport::default();
        let now = Utc::now().timestamp_millis();

        for business in businesses {
            if business.email.trim().is_empty() {
                warn!(business_id = %business.id, "Business has no email, cannot synchronize");
                report.record(RecordOutcome::Skipped {
                    id: business.id,
                    reason: SkipReason::MissingEmail,
                });
                continue;
            }

            let existing = match clients.find_by_email(&business.email).await {
                Ok(existing) => existing,
                Err(err) => {
                    report.record(RecordOutcome::Failed {
                        id: business.id,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            match existing {
                None => {
                    let request = CreateSaasClientRequest {
                        business_id: Some(business.id),
                        business_name: business.business_name.clone(),
                        contact_name: business.contact_name(),
                        email: business.email.clone(),
                        phone: business.phone.clone(),
                        status: "active".to_string(),
                        notes: None,
                        is_in_trial: true,
                        trial_start_date: Some(business.trial_start_date.unwrap_or(now)),
                        trial_end_date: Some(
                            business
                                .trial_end_date
                                .unwrap_or(now + DEFAULT_TRIAL_DAYS * DAY_MILLIS),
                        ),
                        trial_info: None,
                    };

                    match clients.create_client(request).await {
                        Ok(client) => {
                            counter!("payesmart_sync_clients_created_total").increment(1);
                            info!(client_id = %client.id, email = %client.email, "SaaS client created for business in trial");
                            report.record(RecordOutcome::Created { id: client.id });
                        }
                        Err(err) => {
                            warn!(business_id = %business.id, error = %err, "Failed to create SaaS client");
                            report.record(RecordOutcome::Failed {
                                id: business.id,
                                message: err.to_string(),
                            });
                        }
                    }
                }
                Some(client) if !client.is_in_trial => {
                    let start = business
                        .trial_start_date
                        .or(client.trial_start_date)
                        .unwrap_or(now);
                    let end = business
                        .trial_end_date
                        .or(client.trial_end_date)
                        .unwrap_or(now + REVERSE_SYNC_FALLBACK_DAYS * DAY_MILLIS);

                    let client_id = client.id;
                    let mut active = client.into_active_model();
                    active.is_in_trial = Set(true);
                    active.trial_start_date = Set(Some(start));
                    active.trial_end_date = Set(Some(end));
                    active.updated_at = Set(Utc::now().into());

                    match active.update(self.db).await {
                        Ok(_) => {
                            counter!("payesmart_sync_clients_updated_total").increment(1);
                            report.record(RecordOutcome::Updated { id: client_id });
                        }
                        Err(err) => {
                            warn!(%client_id, error = %err, "Failed to re-flag trial on SaaS client");
                            report.record(RecordOutcome::Failed {
                                id: client_id,
                                message: err.to_string(),
                            });
                        }
                    }
                }
                Some(client) => {
                    // Client registry already agrees; it stays authoritative.
                    report.record(RecordOutcome::Skipped {
                        id: client.id,
                        reason: SkipReason::AlreadyConsistent,
                    });
                }
            }
        }

        Ok(report)
    }

    /// Pass 3: tenants holding a subscription with status "active" and an end
    /// date in the future must not be flagged as in trial. Both registries
    /// are corrected in one transaction per tenant.
    #[instrument(skip(self))]
    pub async fn clear_trials_for_active_subscriptions(&self) -> Result<PassReport, SyncError> {
        let subscriptions = SubscriptionRepository::new(self.db).list_active().await?;
        info!(count = subscriptions.len(), "Active subscriptions found");

        let mut report = PassReport::default();
        let now = Utc::now().timestamp_millis();

        for subscription in subscriptions {
            if !subscription.is_current_at(now) {
                info!(
                    subscription_id = %subscription.id,
                    end_date = subscription.end_date,
                    "Active subscription already expired, skipping"
                );
                report.record(RecordOutcome::Skipped {
                    id: subscription.id,
                    reason: SkipReason::SubscriptionExpired,
                });
                continue;
            }

            let business = match Business::find_by_id(subscription.client_id)
                .one(self.db)
                .await
            {
                Ok(Some(business)) => business,
                Ok(None) => {
                    report.record(RecordOutcome::Skipped {
                        id: subscription.client_id,
                        reason: SkipReason::BusinessNotFound,
                    });
                    continue;
                }
                Err(err) => {
                    report.record(RecordOutcome::Failed {
                        id: subscription.client_id,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            if !business.is_in_trial {
                report.record(RecordOutcome::Skipped {
                    id: business.id,
                    reason: SkipReason::AlreadyConsistent,
                });
                continue;
            }

            info!(
                business_id = %business.id,
                business_name = %business.business_name,
                "Tenant has a current subscription but is flagged in trial, correcting"
            );

            let business_id = business.id;
            match self.clear_trial_for_business(business).await {
                Ok(()) => {
                    counter!("payesmart_sync_subscription_overrides_total").increment(1);
                    report.record(RecordOutcome::Updated { id: business_id });
                }
                Err(err) => {
                    warn!(%business_id, error = %err, "Failed to clear trial status");
                    report.record(RecordOutcome::Failed {
                        id: business_id,
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Single-tenant variant of the subscription override, triggered from the
    /// admin console for one client.
    #[instrument(skip(self))]
    pub async fn check_subscription_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<SubscriptionCheck, SyncError> {
        let business = BusinessRepository::new(self.db)
            .get_by_id(client_id)
            .await?
            .ok_or(SyncError::BusinessNotFound(client_id))?;

        let has_active = SubscriptionRepository::new(self.db)
            .has_active_for_client(client_id)
            .await?;

        if !has_active {
            return Ok(SubscriptionCheck::NoActiveSubscription);
        }

        info!(%client_id, "Tenant has an active subscription, clearing trial status");
        self.clear_trial_for_business(business).await?;

        Ok(SubscriptionCheck::TrialCleared)
    }

    /// Apply a trial window to a business, writing the same window back to
    /// the client first when it carried none of its own.
    async fn mirror_window_onto_business(
        &self,
        client: crate::models::saas_client::Model,
        persist_client_window: bool,
        business: crate::models::business::Model,
        start: i64,
        end: i64,
    ) -> Result<(), sea_orm::DbErr> {
        let txn = self.db.begin().await?;

        if persist_client_window {
            let mut active = client.into_active_model();
            active.trial_start_date = Set(Some(start));
            active.trial_end_date = Set(Some(end));
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
        }

        let mut active = business.into_active_model();
        active.is_in_trial = Set(true);
        active.trial_start_date = Set(Some(start));
        active.trial_end_date = Set(Some(end));
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await
    }

    /// Clear the trial flag on a business and its mirrored client in one
    /// transaction.
    async fn clear_trial_for_business(
        &self,
        business: crate::models::business::Model,
    ) -> Result<(), sea_orm::DbErr> {
        use crate::models::saas_client::{Column as SaasClientColumn, Entity as SaasClient};
        use sea_orm::{ColumnTrait, QueryFilter};

        let business_id = business.id;
        let txn = self.db.begin().await?;

        let mut active = business.into_active_model();
        active.is_in_trial = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        if let Some(client) = SaasClient::find()
            .filter(SaasClientColumn::BusinessId.eq(business_id))
            .one(&txn)
            .await?
        {
            let mut active = client.into_active_model();
            active.is_in_trial = Set(false);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
        }

        txn.commit().await
    }
}

/// Format an epoch-millis timestamp as DD/MM/YYYY for display.
fn format_date(timestamp_millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_millis)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}
