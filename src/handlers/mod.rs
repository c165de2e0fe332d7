//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the PayeSmart
//! admin API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod businesses;
pub mod clients;
pub mod sync;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response metadata
    pub meta: ResponseMeta,
}

/// Response metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    /// Unique request identifier for tracing
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub request_id: String,
    /// Response timestamp (ISO 8601)
    #[schema(example = "2024-01-15T10:30:00Z")]
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta {
                request_id: Uuid::new_v4().to_string(),
                timestamp: Utc::now().to_rfc3339(),
            },
        }
    }
}

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Health status payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// Overall status, "ok" when the database answers
    #[schema(example = "ok")]
    pub status: String,
}

/// Liveness and database health probe
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus),
        (status = 503, description = "Database is unreachable", body = ApiError)
    ),
    tag = "health"
)]
pub async fn healthz(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    crate::db::health_check(&state.db).await.map_err(|e| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "DATABASE_UNAVAILABLE",
            "Database health check failed",
        )
        .with_details(serde_json::json!({ "error": e.to_string() }))
    })?;

    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}
