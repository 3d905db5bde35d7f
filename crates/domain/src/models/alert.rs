//! Alert domain model.
//!
//! Alerts are write-once records raised by background processes, currently
//! only when the reaper force-closes a stale work session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::work_session::WorkSession;

/// Kind of alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    WorkSessionAutoClosed,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::WorkSessionAutoClosed => "work_session_auto_closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "work_session_auto_closed" => Some(AlertKind::WorkSessionAutoClosed),
            _ => None,
        }
    }
}

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "info" => Some(AlertSeverity::Info),
            "warning" => Some(AlertSeverity::Warning),
            "critical" => Some(AlertSeverity::Critical),
            _ => None,
        }
    }
}

/// Timing details attached to an auto-close alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoClosedPayload {
    pub auto_closed_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub minutes: i32,
}

/// An alert record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub company_id: Uuid,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    /// ID of the entity the alert is about.
    pub entity_ref: Uuid,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Alert for a session the reaper just closed.
    ///
    /// Returns `None` if the session has not been closed yet.
    pub fn session_auto_closed(session: &WorkSession) -> Option<Self> {
        let auto_closed_at = session.ended_at?;
        let payload = AutoClosedPayload {
            auto_closed_at,
            started_at: session.started_at,
            minutes: session.effective_minutes?,
        };

        Some(Self {
            id: Uuid::new_v4(),
            company_id: session.company_id,
            kind: AlertKind::WorkSessionAutoClosed,
            severity: AlertSeverity::Warning,
            entity_ref: session.id,
            payload: serde_json::to_value(payload).ok()?,
            created_at: auto_closed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::work_session::SessionStatus;
    use chrono::Duration;

    #[test]
    fn test_alert_for_closed_session() {
        let started_at = Utc::now() - Duration::hours(13);
        let ended_at = started_at + Duration::hours(13);
        let mut session = WorkSession::open(Uuid::new_v4(), Uuid::new_v4(), started_at);
        session.status = SessionStatus::AutoClosed;
        session.ended_at = Some(ended_at);
        session.effective_minutes = Some(780);

        let alert = Alert::session_auto_closed(&session).unwrap();
        assert_eq!(alert.kind, AlertKind::WorkSessionAutoClosed);
        assert_eq!(alert.severity, AlertSeverity::Warning);
        assert_eq!(alert.entity_ref, session.id);
        assert_eq!(alert.company_id, session.company_id);
        assert_eq!(alert.payload["minutes"], 780);
        assert!(alert.payload["started_at"].is_string());
        assert!(alert.payload["auto_closed_at"].is_string());
    }

    #[test]
    fn test_no_alert_for_open_session() {
        let session = WorkSession::open(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        assert!(Alert::session_auto_closed(&session).is_none());
    }

    #[test]
    fn test_alert_kind_strings() {
        assert_eq!(
            AlertKind::WorkSessionAutoClosed.as_str(),
            "work_session_auto_closed"
        );
        assert_eq!(AlertSeverity::from_str("warning"), Some(AlertSeverity::Warning));
        assert_eq!(AlertKind::from_str("unknown"), None);
    }
}
