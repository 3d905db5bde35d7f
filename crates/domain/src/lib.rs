//! Domain layer for the timeclock backend.
//!
//! This crate contains:
//! - Domain models (Profile, Device, ClockEvent, WorkSession, Alert)
//! - The attendance event processor and the stale session reaper
//! - Collaborator traits and their in-memory implementations
//! - The clock failure taxonomy

pub mod error;
pub mod memory;
pub mod models;
pub mod ports;
pub mod services;

pub use error::ClockError;
