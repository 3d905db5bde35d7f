//! Shared utilities and common types for the Timeclock backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Access token verification for the identity provider's JWTs
//! - Common validation logic

pub mod jwt;
pub mod validation;
