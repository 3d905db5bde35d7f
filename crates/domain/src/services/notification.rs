//! Notification hook for registered clock events.
//!
//! Delivery is fire-and-forget: failures are logged and never reach the caller.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::{ClockAction, ClockSource};

/// Failure reported by a notification sink.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotificationError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Receives human-readable notification messages.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), NotificationError>;
}

/// Message sent after a clock event was registered.
pub fn clock_message(display_name: &str, action: ClockAction, source: ClockSource) -> String {
    format!("{} registered {} ({})", display_name, action, source)
}

/// Sends `message` on a background task.
pub fn dispatch(sink: Arc<dyn NotificationSink>, message: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = sink.notify(&message).await {
            warn!(error = %e, "Failed to deliver clock notification");
        }
    })
}

/// Sink used when no delivery channel is configured.
///
/// Only logs each message; nothing is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotificationSink;

#[async_trait::async_trait]
impl NotificationSink for LoggingNotificationSink {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        info!(message = %message, "Clock notification (no delivery channel configured)");
        Ok(())
    }
}

/// Mock notification sink for testing.
///
/// Logs and records messages instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationSink {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock sink that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl NotificationSink for MockNotificationSink {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        if self.simulate_failure {
            return Err(NotificationError::Delivery(
                "Simulated failure for testing".to_string(),
            ));
        }

        info!(message = %message, "Mock: would send notification");
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_message() {
        assert_eq!(
            clock_message("Ada Lovelace", ClockAction::BreakStart, ClockSource::Kiosk),
            "Ada Lovelace registered break_start (kiosk)"
        );
    }

    #[tokio::test]
    async fn test_dispatch_delivers() {
        let sink = MockNotificationSink::new();
        dispatch(Arc::new(sink.clone()), "hello".to_string())
            .await
            .unwrap();
        assert_eq!(sink.sent(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_logging_sink_accepts_every_message() {
        let sink: Arc<dyn NotificationSink> = Arc::new(LoggingNotificationSink);
        for i in 0..10_000 {
            assert!(sink.notify(&format!("Employee registered in ({})", i)).await.is_ok());
        }
        assert_eq!(std::mem::size_of::<LoggingNotificationSink>(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let sink = MockNotificationSink::failing();
        let handle = dispatch(Arc::new(sink.clone()), "hello".to_string());
        assert!(handle.await.is_ok());
        assert!(sink.sent().is_empty());
    }
}
