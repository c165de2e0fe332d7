//! Subscription entity model
//!
//! This module contains the SeaORM entity model for the subscriptions table.
//! Rows are owned by the billing subsystem; the synchronizer only reads them
//! to decide whether a tenant's trial flag should be cleared.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Subscription status carried by billing for a paid subscription.
pub const STATUS_ACTIVE: &str = "active";

/// Subscription entity representing a paid access record for a tenant
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    /// Unique identifier for the subscription (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant the subscription belongs to; carries the business id
    pub client_id: Uuid,

    /// Billing plan identifier
    pub plan_id: Option<String>,

    /// Subscription status (active, cancelled, expired, pending)
    pub status: String,

    /// Start of the paid period (epoch milliseconds)
    pub start_date: Option<i64>,

    /// End of the paid period (epoch milliseconds)
    pub end_date: i64,

    /// Whether the subscription renews automatically
    pub auto_renew: bool,

    /// Timestamp when the subscription was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A subscription grants paid access while its end date is in the future.
    pub fn is_current_at(&self, now_millis: i64) -> bool {
        self.status == STATUS_ACTIVE && self.end_date > now_millis
    }
}
