//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities, providing a clean API for data access.
//! Repositories own the read/query surface; the trial synchronizer performs
//! its multi-row writes directly on transactions.

pub mod business;
pub mod saas_client;
pub mod subscription;
pub mod trial_period;

pub use business::{BusinessRepository, CreateBusinessRequest};
pub use saas_client::{CreateSaasClientRequest, SaasClientRepository};
pub use subscription::SubscriptionRepository;
pub use trial_period::TrialPeriodRepository;
