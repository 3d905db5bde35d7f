//! HTTP route handlers.

pub mod admin;
pub mod clock;
pub mod health;
pub mod work_sessions;
