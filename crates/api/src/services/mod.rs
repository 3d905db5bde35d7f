//! Integrations with external services.

pub mod slack;

pub use slack::{notification_sink, SlackNotificationSink};
