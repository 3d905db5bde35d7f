//! Background job that force-closes stale work sessions.

use domain::services::StaleSessionReaper;
use tracing::info;

use super::scheduler::{Job, JobError, JobFrequency};
use crate::middleware::record_sessions_auto_closed;

/// Job that runs the stale session reaper on a fixed interval.
pub struct AutoCloseSessionsJob {
    reaper: StaleSessionReaper,
    interval_minutes: u64,
}

impl AutoCloseSessionsJob {
    /// Create a new auto-close job running every `interval_minutes`.
    pub fn new(reaper: StaleSessionReaper, interval_minutes: u64) -> Self {
        Self {
            reaper,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for AutoCloseSessionsJob {
    fn name(&self) -> &'static str {
        "auto_close_sessions"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), JobError> {
        let report = self
            .reaper
            .run()
            .await
            .map_err(|e| JobError::Failed(format!("Failed to find stale sessions: {}", e)))?;

        record_sessions_auto_closed(report.closed_count);
        if report.closed_count > 0 {
            info!(closed_count = report.closed_count, "Auto-closed stale work sessions");
        }
        Ok(())
    }
}
