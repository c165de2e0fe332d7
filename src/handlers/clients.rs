//! # SaaS Client API Handlers
//!
//! Listing and reporting endpoints over the SaaS client registry, including
//! the enriched trial listing and the trailing-30-day conversion rate.

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::OperatorAuth;
use crate::error::ApiError;
use crate::repositories::SaasClientRepository;
use crate::server::AppState;

use super::ApiResponse;

pub use crate::repositories::saas_client::{ConversionRate, TrialClientView};

/// SaaS client record as exposed by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaasClientDto {
    pub id: Uuid,
    /// Business this client mirrors, if linked
    pub business_id: Option<Uuid>,
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Account status, e.g. "active"
    pub status: String,
    pub notes: Option<String>,
    pub is_in_trial: bool,
    /// Trial window start, epoch milliseconds
    pub trial_start_date: Option<i64>,
    /// Trial window end, epoch milliseconds
    pub trial_end_date: Option<i64>,
    /// Details of the trial period that was applied at provisioning
    pub trial_info: Option<serde_json::Value>,
}

impl From<crate::models::saas_client::Model> for SaasClientDto {
    fn from(model: crate::models::saas_client::Model) -> Self {
        Self {
            id: model.id,
            business_id: model.business_id,
            business_name: model.business_name,
            contact_name: model.contact_name,
            email: model.email,
            phone: model.phone,
            status: model.status,
            notes: model.notes,
            is_in_trial: model.is_in_trial,
            trial_start_date: model.trial_start_date,
            trial_end_date: model.trial_end_date,
            trial_info: model.trial_info,
        }
    }
}

/// List all SaaS clients
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Clients retrieved", body = ApiResponse<Vec<SaasClientDto>>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
) -> Result<Json<ApiResponse<Vec<SaasClientDto>>>, ApiError> {
    let clients = SaasClientRepository::new(&state.db).list_all().await?;
    let dtos: Vec<SaasClientDto> = clients.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::new(dtos)))
}

/// List clients currently in trial, enriched with business-registry data
#[utoipa::path(
    get,
    path = "/api/v1/clients/trial",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Trial clients retrieved", body = ApiResponse<Vec<TrialClientView>>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn list_trial_clients(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
) -> Result<Json<ApiResponse<Vec<TrialClientView>>>, ApiError> {
    let views = SaasClientRepository::new(&state.db)
        .trial_clients_with_business_data()
        .await?;
    Ok(Json(ApiResponse::new(views)))
}

/// Trial-to-subscription conversion rate over the trailing 30 days
#[utoipa::path(
    get,
    path = "/api/v1/clients/conversion",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Conversion statistics", body = ApiResponse<ConversionRate>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn conversion_rate(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
) -> Result<Json<ApiResponse<ConversionRate>>, ApiError> {
    let now = chrono::Utc::now().timestamp_millis();
    let stats = SaasClientRepository::new(&state.db)
        .conversion_rate(now)
        .await?;
    Ok(Json(ApiResponse::new(stats)))
}
