//! Persistence layer for the timeclock backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Postgres implementations of the domain collaborator traits

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;

pub use repositories::{CompanyRepository, DeviceRepository, PgAttendanceStore, ProfileRepository};

/// Converts a driver error into the domain storage error.
pub(crate) fn store_error(err: sqlx::Error) -> domain::ports::StoreError {
    domain::ports::StoreError::Database(err.to_string())
}
