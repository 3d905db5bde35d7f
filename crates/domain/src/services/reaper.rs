//! Stale session reaper.
//!
//! Force-closes work sessions that stayed open longer than the configured
//! maximum and raises an alert for each one.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::models::Alert;
use crate::ports::{AttendanceStore, StoreError};

/// Default maximum session length.
pub const DEFAULT_MAX_SESSION_MINUTES: i64 = 720;

/// Maximum number of sessions closed per run.
pub const DEFAULT_BATCH_SIZE: i64 = 500;

/// Result of one reaper run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaperReport {
    pub closed_count: u32,
}

#[derive(Clone)]
pub struct StaleSessionReaper {
    store: Arc<dyn AttendanceStore>,
    max_duration: Duration,
    batch_size: i64,
}

impl StaleSessionReaper {
    pub fn new(store: Arc<dyn AttendanceStore>, max_session_minutes: i64, batch_size: i64) -> Self {
        Self {
            store,
            max_duration: Duration::minutes(max_session_minutes),
            batch_size,
        }
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    pub async fn run(&self) -> Result<ReaperReport, StoreError> {
        self.run_at(Utc::now()).await
    }

    /// Closes every session that started strictly before `now - max_duration`.
    ///
    /// Only the lookup can fail the run. A session that cannot be closed is
    /// logged and skipped; a failed alert write is logged and the session still
    /// counts as closed.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<ReaperReport, StoreError> {
        let cutoff = now - self.max_duration;
        let stale = self
            .store
            .find_stale_sessions(cutoff, self.batch_size)
            .await?;

        if stale.is_empty() {
            return Ok(ReaperReport::default());
        }

        let mut report = ReaperReport::default();
        for candidate in stale {
            let closed = match self.store.auto_close_session(candidate.id, now).await {
                Ok(Some(closed)) => closed,
                Ok(None) => continue,
                Err(e) => {
                    error!(session_id = %candidate.id, error = %e, "Failed to auto-close session");
                    continue;
                }
            };
            report.closed_count += 1;

            if let Some(alert) = Alert::session_auto_closed(&closed) {
                if let Err(e) = self.store.insert_alert(&alert).await {
                    warn!(
                        session_id = %closed.id,
                        error = %e,
                        "Failed to write auto-close alert"
                    );
                }
            }

            info!(
                session_id = %closed.id,
                employee_id = %closed.employee_id,
                company_id = %closed.company_id,
                minutes = closed.effective_minutes.unwrap_or_default(),
                "Auto-closed stale work session"
            );
        }

        Ok(report)
    }
}
