//! # Data Models
//!
//! This module contains all the data models used throughout the PayeSmart
//! admin sync service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod business;
pub mod saas_client;
pub mod subscription;
pub mod trial_period;

pub use business::Entity as Business;
pub use saas_client::Entity as SaasClient;
pub use subscription::Entity as Subscription;
pub use trial_period::Entity as TrialPeriod;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "payesmart-admin".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
