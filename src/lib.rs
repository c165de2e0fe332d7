//! # PayeSmart Admin API Library
//!
//! This library provides the core functionality for the PayeSmart admin
//! service, including the trial-status synchronizer, handlers, models and
//! server configuration.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub mod trial_sync;
pub use migration;
