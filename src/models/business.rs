//! Business entity model
//!
//! This module contains the SeaORM entity model for the businesses table,
//! the registry of tenant organizations created at registration.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Business entity representing a registered tenant organization
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "businesses")]
pub struct Model {
    /// Unique identifier for the business (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name of the business
    pub business_name: String,

    /// First name of the registered owner
    pub owner_first_name: Option<String>,

    /// Last name of the registered owner
    pub owner_last_name: Option<String>,

    /// Contact email, unique across businesses; join key for the SaaS client registry
    pub email: String,

    /// Contact phone number (optional)
    pub phone: Option<String>,

    /// Whether the tenant currently has trial access
    pub is_in_trial: bool,

    /// Start of the trial window (epoch milliseconds)
    pub trial_start_date: Option<i64>,

    /// End of the trial window (epoch milliseconds)
    pub trial_end_date: Option<i64>,

    /// Timestamp when the business was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the business was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::saas_client::Entity")]
    SaasClient,
}

impl Related<super::saas_client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaasClient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Owner full name as shown in the admin console, falling back to the
    /// business name when neither owner field is set.
    pub fn contact_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.owner_first_name.as_deref().unwrap_or(""),
            self.owner_last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();

        if name.is_empty() {
            self.business_name.clone()
        } else {
            name
        }
    }
}
