//! # PayeSmart Admin API Main Entry Point
//!
//! Loads configuration, initializes telemetry, runs pending migrations and
//! seeds, then starts the HTTP server.

use payesmart::migration::{Migrator, MigratorTrait};
use payesmart::{config::ConfigLoader, db, seeds, server::run_server, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(configuration = %redacted_json, "Effective configuration");
    }

    let pool = db::init_pool(&config).await?;

    Migrator::up(&pool, None).await?;
    seeds::run_seeds(&config, &pool).await?;

    run_server(config, pool).await
}
