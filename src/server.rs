//! # Server Configuration
//!
//! This module contains the server setup and configuration for the PayeSmart
//! admin API.

use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request},
    middleware::Next,
    response::Response,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::{TraceContext, with_trace_context};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Middleware that establishes a per-request trace context. An inbound
/// `X-Trace-Id` header is honored, otherwise a fresh ID is generated.
pub async fn trace_context_middleware(mut request: Request, next: Next) -> Response {
    let trace_id = request
        .headers()
        .get("x-trace-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let context = TraceContext {
        trace_id: trace_id.clone(),
    };
    request.extensions_mut().insert(context.clone());

    let mut response = with_trace_context(context, next.run(request)).await;
    if let Ok(header_value) = trace_id.parse() {
        response.headers_mut().insert("x-trace-id", header_value);
    }
    response
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/v1/sync/trial-status",
            post(handlers::sync::run_trial_sync),
        )
        .route(
            "/api/v1/clients/{id}/subscription-check",
            post(handlers::sync::check_client_subscription),
        )
        .route(
            "/api/v1/businesses",
            post(handlers::businesses::create_business).get(handlers::businesses::list_businesses),
        )
        .route("/api/v1/clients", get(handlers::clients::list_clients))
        .route(
            "/api/v1/clients/trial",
            get(handlers::clients::list_trial_clients),
        )
        .route(
            "/api/v1/clients/conversion",
            get(handlers::clients::conversion_rate),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state.config),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .merge(protected)
        .layer(axum::middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let state = AppState {
        db,
        config: Arc::new(config),
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

struct BearerAuthAddon;

impl Modify for BearerAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Operator bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::sync::run_trial_sync,
        crate::handlers::sync::check_client_subscription,
        crate::handlers::businesses::create_business,
        crate::handlers::businesses::list_businesses,
        crate::handlers::clients::list_clients,
        crate::handlers::clients::list_trial_clients,
        crate::handlers::clients::conversion_rate,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthStatus,
            crate::handlers::sync::SyncReportDto,
            crate::handlers::sync::SubscriptionCheckDto,
            crate::handlers::businesses::CreateBusinessDto,
            crate::handlers::businesses::BusinessDto,
            crate::handlers::businesses::BusinessCreatedDto,
            crate::handlers::clients::SaasClientDto,
            crate::handlers::clients::TrialClientView,
            crate::handlers::clients::ConversionRate,
            crate::trial_sync::SyncReport,
            crate::trial_sync::PassReport,
            crate::trial_sync::RecordOutcome,
            crate::trial_sync::SkipReason,
            crate::models::saas_client::TrialInfo,
            crate::error::ApiError,
        )
    ),
    modifiers(&BearerAuthAddon),
    info(
        title = "PayeSmart Admin API",
        description = "Trial-status synchronization and tenant administration",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
