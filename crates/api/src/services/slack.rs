//! Slack notification sink.
//!
//! Posts clock notifications to a Slack incoming webhook.

use std::sync::Arc;
use std::time::Duration;

use domain::services::{LoggingNotificationSink, NotificationError, NotificationSink};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::NotificationsConfig;

/// Body of an incoming webhook message.
#[derive(Debug, Serialize)]
struct SlackMessage<'a> {
    text: &'a str,
}

pub struct SlackNotificationSink {
    client: Client,
    webhook_url: String,
}

impl SlackNotificationSink {
    pub fn new(webhook_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            webhook_url,
        })
    }
}

#[async_trait::async_trait]
impl NotificationSink for SlackNotificationSink {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&SlackMessage { text: message })
            .send()
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Delivery(format!(
                "Slack webhook responded with {}",
                status
            )));
        }

        debug!("Clock notification delivered to Slack");
        Ok(())
    }
}

/// Builds the sink configured for this deployment.
///
/// Without a webhook URL notifications are only logged.
pub fn notification_sink(
    config: &NotificationsConfig,
) -> Result<Arc<dyn NotificationSink>, reqwest::Error> {
    if config.slack_webhook_url.is_empty() {
        info!("Slack webhook not configured, clock notifications will only be logged");
        return Ok(Arc::new(LoggingNotificationSink));
    }

    let sink = SlackNotificationSink::new(
        config.slack_webhook_url.clone(),
        Duration::from_millis(config.timeout_ms),
    )?;
    Ok(Arc::new(sink))
}
