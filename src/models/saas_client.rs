//! SaaS client entity model
//!
//! This module contains the SeaORM entity model for the saas_clients table,
//! the admin-console view of a business. Trial fields are denormalized from
//! the business registry and reconciled by the trial synchronizer.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// SaaS client entity, the administrative mirror of a business
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "saas_clients")]
pub struct Model {
    /// Unique identifier for the SaaS client (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Back-reference to the business; absent for clients imported before
    /// the business registry existed
    pub business_id: Option<Uuid>,

    /// Display name of the business
    pub business_name: String,

    /// Contact person name
    pub contact_name: String,

    /// Contact email; join key toward the business registry
    pub email: String,

    /// Contact phone number (optional)
    pub phone: Option<String>,

    /// Account status (active, inactive, pending)
    pub status: String,

    /// Free-text admin notes
    pub notes: Option<String>,

    /// Whether the client currently has trial access
    pub is_in_trial: bool,

    /// Start of the trial window (epoch milliseconds)
    pub trial_start_date: Option<i64>,

    /// End of the trial window (epoch milliseconds)
    pub trial_end_date: Option<i64>,

    /// Snapshot of the trial period applied at provisioning time
    #[sea_orm(column_type = "JsonBinary")]
    pub trial_info: Option<JsonValue>,

    /// Timestamp when the client was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the client was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::business::Entity",
        from = "Column::BusinessId",
        to = "super::business::Column::Id"
    )]
    Business,
}

impl Related<super::business::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Business.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Snapshot of the trial period applied when a client was provisioned,
/// stored in the `trial_info` JSON column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrialInfo {
    /// Identifier of the trial period configuration that was applied
    pub trial_period_id: String,
    /// Display name of the trial period
    pub trial_period_name: String,
    /// Duration in whole days
    pub duration_days: i32,
    /// Additional duration in minutes
    pub duration_minutes: i32,
    /// Human-readable end date (DD/MM/YYYY)
    pub formatted_end_date: String,
}
