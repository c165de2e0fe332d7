//! # Synchronization API Handlers
//!
//! Endpoints triggering the trial-status synchronizer, either for the whole
//! estate or for a single tenant.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::OperatorAuth;
use crate::error::ApiError;
use crate::server::AppState;
use crate::trial_sync::{SubscriptionCheck, SyncReport, TrialSynchronizer};

use super::ApiResponse;

/// Result of a full synchronization run
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SyncReportDto {
    /// One-line summary suitable for the admin console
    #[schema(example = "3 businesses synchronized from clients. 1 clients created, 0 clients updated from businesses. 2 tenants with active subscriptions corrected. 0 failures in total.")]
    pub summary: String,
    /// Per-record outcomes of every pass
    pub report: SyncReport,
}

/// Run the full trial-status synchronization
#[utoipa::path(
    post,
    path = "/api/v1/sync/trial-status",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Synchronization finished", body = ApiResponse<SyncReportDto>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "sync"
)]
pub async fn run_trial_sync(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
) -> Result<Json<ApiResponse<SyncReportDto>>, ApiError> {
    let report = TrialSynchronizer::new(&state.db)
        .synchronize_trial_status()
        .await?;

    Ok(Json(ApiResponse::new(SyncReportDto {
        summary: report.summary(),
        report,
    })))
}

/// Result of the per-tenant subscription check
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionCheckDto {
    /// Tenant the check ran against
    pub client_id: Uuid,
    /// Whether trial flags were cleared
    pub trial_cleared: bool,
    /// Human-readable outcome
    #[schema(example = "Trial status cleared, tenant holds an active subscription")]
    pub message: String,
}

/// Check one tenant's subscriptions and clear its trial status if an active
/// subscription is found
#[utoipa::path(
    post,
    path = "/api/v1/clients/{id}/subscription-check",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Tenant (business) UUID")
    ),
    responses(
        (status = 200, description = "Check finished", body = ApiResponse<SubscriptionCheckDto>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Tenant not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "sync"
)]
pub async fn check_client_subscription(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SubscriptionCheckDto>>, ApiError> {
    let outcome = TrialSynchronizer::new(&state.db)
        .check_subscription_for_client(id)
        .await?;

    let dto = match outcome {
        SubscriptionCheck::TrialCleared => SubscriptionCheckDto {
            client_id: id,
            trial_cleared: true,
            message: "Trial status cleared, tenant holds an active subscription".to_string(),
        },
        SubscriptionCheck::NoActiveSubscription => SubscriptionCheckDto {
            client_id: id,
            trial_cleared: false,
            message: "No active subscription found, trial status left unchanged".to_string(),
        },
    };

    Ok(Json(ApiResponse::new(dto)))
}
