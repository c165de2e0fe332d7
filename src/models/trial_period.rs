//! Trial period entity model
//!
//! Trial period configurations managed from the admin console. At most one
//! row is active at a time; it determines the trial window applied to newly
//! registered tenants.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Trial period configuration entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trial_periods")]
pub struct Model {
    /// Unique identifier for the trial period (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name (e.g. "Standard 30-day trial")
    pub name: String,

    /// Duration in whole days
    pub days: i32,

    /// Additional duration in minutes (used for short demo trials)
    pub minutes: i32,

    /// Whether this period is the one applied to new registrations
    pub is_active: bool,

    /// Optional description shown in the admin console
    pub description: Option<String>,

    /// Timestamp when the period was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the period was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Total duration of the period in milliseconds.
    pub fn duration_millis(&self) -> i64 {
        i64::from(self.days) * 24 * 60 * 60 * 1000 + i64::from(self.minutes) * 60 * 1000
    }
}
