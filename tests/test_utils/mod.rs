//! Test utilities for database testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations applied, plus fixture builders for the three registries.

// Each integration test binary compiles this module; not every binary uses
// every fixture helper.
#![allow(dead_code)]

use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set, Statement};
use uuid::Uuid;

use payesmart::migration::{Migrator, MigratorTrait};
use payesmart::models::{business, saas_client, subscription, trial_period};

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    // SQLite does not enforce our Postgres foreign key semantics; disable FK
    // checks so fixtures can be inserted without satisfying every relation.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await?;

    Ok(db)
}

/// Fixture for a business registry row.
pub struct BusinessFixture {
    pub business_name: String,
    pub email: String,
    pub is_in_trial: bool,
    pub trial_start_date: Option<i64>,
    pub trial_end_date: Option<i64>,
}

impl Default for BusinessFixture {
    fn default() -> Self {
        Self {
            business_name: "Test Business".to_string(),
            email: format!("business-{}@example.com", Uuid::new_v4()),
            is_in_trial: false,
            trial_start_date: None,
            trial_end_date: None,
        }
    }
}

pub async fn insert_business(
    db: &DatabaseConnection,
    fixture: BusinessFixture,
) -> Result<business::Model> {
    let now = Utc::now();
    let model = business::ActiveModel {
        id: Set(Uuid::new_v4()),
        business_name: Set(fixture.business_name),
        owner_first_name: Set(Some("Test".to_string())),
        owner_last_name: Set(Some("Owner".to_string())),
        email: Set(fixture.email),
        phone: Set(None),
        is_in_trial: Set(fixture.is_in_trial),
        trial_start_date: Set(fixture.trial_start_date),
        trial_end_date: Set(fixture.trial_end_date),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    Ok(model.insert(db).await?)
}

/// Fixture for a SaaS client registry row.
pub struct ClientFixture {
    pub business_id: Option<Uuid>,
    pub business_name: String,
    pub email: String,
    pub is_in_trial: bool,
    pub trial_start_date: Option<i64>,
    pub trial_end_date: Option<i64>,
}

impl Default for ClientFixture {
    fn default() -> Self {
        Self {
            business_id: None,
            business_name: "Test Business".to_string(),
            email: format!("client-{}@example.com", Uuid::new_v4()),
            is_in_trial: false,
            trial_start_date: None,
            trial_end_date: None,
        }
    }
}

pub async fn insert_client(
    db: &DatabaseConnection,
    fixture: ClientFixture,
) -> Result<saas_client::Model> {
    let now = Utc::now();
    let model = saas_client::ActiveModel {
        id: Set(Uuid::new_v4()),
        business_id: Set(fixture.business_id),
        business_name: Set(fixture.business_name),
        contact_name: Set("Test Owner".to_string()),
        email: Set(fixture.email),
        phone: Set(None),
        status: Set("active".to_string()),
        notes: Set(None),
        is_in_trial: Set(fixture.is_in_trial),
        trial_start_date: Set(fixture.trial_start_date),
        trial_end_date: Set(fixture.trial_end_date),
        trial_info: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    Ok(model.insert(db).await?)
}

/// Inserts a subscription row for the given tenant (business id).
pub async fn insert_subscription(
    db: &DatabaseConnection,
    client_id: Uuid,
    status: &str,
    end_date: i64,
) -> Result<subscription::Model> {
    let now = Utc::now();
    let model = subscription::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        plan_id: Set(Some("standard".to_string())),
        status: Set(status.to_string()),
        start_date: Set(Some(now.timestamp_millis() - 1000)),
        end_date: Set(end_date),
        auto_renew: Set(false),
        created_at: Set(now.into()),
    };
    Ok(model.insert(db).await?)
}

/// Inserts a trial period configuration.
#[allow(dead_code)]
pub async fn insert_trial_period(
    db: &DatabaseConnection,
    name: &str,
    days: i32,
    minutes: i32,
    is_active: bool,
) -> Result<trial_period::Model> {
    let now = Utc::now();
    let model = trial_period::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        days: Set(days),
        minutes: Set(minutes),
        is_active: Set(is_active),
        description: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    Ok(model.insert(db).await?)
}
