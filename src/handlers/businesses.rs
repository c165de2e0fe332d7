//! # Business API Handlers
//!
//! Registration and listing endpoints for the business registry. Registering
//! a business also provisions its mirrored SaaS client with a trial window.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::OperatorAuth;
use crate::error::{ApiError, validation_error};
use crate::repositories::{BusinessRepository, CreateBusinessRequest};
use crate::server::AppState;
use crate::trial_sync::{ProvisionOutcome, TrialSynchronizer};

use super::ApiResponse;

/// Request payload for registering a business
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateBusinessDto {
    /// Display name of the business
    #[schema(example = "Boulangerie Martin")]
    pub business_name: String,
    /// Owner first name
    pub owner_first_name: Option<String>,
    /// Owner last name
    pub owner_last_name: Option<String>,
    /// Contact email, unique across the registry
    #[schema(example = "contact@boulangerie-martin.fr")]
    pub email: String,
    /// Contact phone number
    pub phone: Option<String>,
}

/// Business record as exposed by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BusinessDto {
    pub id: Uuid,
    pub business_name: String,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub is_in_trial: bool,
    /// Trial window start, epoch milliseconds
    pub trial_start_date: Option<i64>,
    /// Trial window end, epoch milliseconds
    pub trial_end_date: Option<i64>,
    /// Registration timestamp (ISO 8601)
    pub created_at: String,
}

impl From<crate::models::business::Model> for BusinessDto {
    fn from(model: crate::models::business::Model) -> Self {
        Self {
            id: model.id,
            business_name: model.business_name,
            owner_first_name: model.owner_first_name,
            owner_last_name: model.owner_last_name,
            email: model.email,
            phone: model.phone,
            is_in_trial: model.is_in_trial,
            trial_start_date: model.trial_start_date,
            trial_end_date: model.trial_end_date,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Response payload for business registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BusinessCreatedDto {
    /// The registered business
    pub business: BusinessDto,
    /// SaaS client provisioned alongside the registration
    pub client_id: Uuid,
}

/// Register a new business and provision its SaaS client
#[utoipa::path(
    post,
    path = "/api/v1/businesses",
    security(("bearer_auth" = [])),
    request_body = CreateBusinessDto,
    responses(
        (status = 201, description = "Business registered", body = ApiResponse<BusinessCreatedDto>, headers(
            ("Location", description = "URL of the created business")
        )),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 409, description = "A business with this email already exists", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "businesses"
)]
pub async fn create_business(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Json(request): Json<CreateBusinessDto>,
) -> Result<
    (
        StatusCode,
        [(&'static str, String); 1],
        Json<ApiResponse<BusinessCreatedDto>>,
    ),
    ApiError,
> {
    if request.business_name.trim().is_empty() {
        return Err(validation_error(
            "Business name is required",
            serde_json::json!({ "business_name": "Must be provided and cannot be empty" }),
        ));
    }
    if request.email.trim().is_empty() {
        return Err(validation_error(
            "Email is required",
            serde_json::json!({ "email": "Must be provided and cannot be empty" }),
        ));
    }

    let repo = BusinessRepository::new(&state.db);

    if let Some(existing) = repo.find_by_email(request.email.trim()).await? {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            "A business with this email already exists",
        )
        .with_details(serde_json::json!({ "business_id": existing.id })));
    }

    let business = repo
        .create_business(CreateBusinessRequest {
            business_name: request.business_name.trim().to_string(),
            owner_first_name: request.owner_first_name,
            owner_last_name: request.owner_last_name,
            email: request.email.trim().to_string(),
            phone: request.phone,
        })
        .await?;

    let outcome = TrialSynchronizer::new(&state.db)
        .provision_client_for_business(business.id)
        .await?;
    let client_id = match outcome {
        ProvisionOutcome::Created { client_id } | ProvisionOutcome::AlreadyLinked { client_id } => {
            client_id
        }
    };

    let location = format!("/api/v1/businesses/{}", business.id);
    let response = ApiResponse::new(BusinessCreatedDto {
        business: business.into(),
        client_id,
    });

    Ok((StatusCode::CREATED, [("Location", location)], Json(response)))
}

/// List all registered businesses
#[utoipa::path(
    get,
    path = "/api/v1/businesses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Businesses retrieved", body = ApiResponse<Vec<BusinessDto>>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "businesses"
)]
pub async fn list_businesses(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
) -> Result<Json<ApiResponse<Vec<BusinessDto>>>, ApiError> {
    let businesses = BusinessRepository::new(&state.db).list_all().await?;
    let dtos: Vec<BusinessDto> = businesses.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::new(dtos)))
}
