//! Collaborator traits consumed by the event processor and the reaper.
//!
//! The Postgres implementations live in the `persistence` crate; in-memory
//! implementations for tests and local runs live in [`crate::memory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ClockError;
use crate::models::{Alert, ClockEvent, CompanyAccount, Device, Profile, WorkSession};
use crate::services::session_machine::SessionError;

/// Storage failure reported by a collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

impl From<StoreError> for ClockError {
    fn from(err: StoreError) -> Self {
        ClockError::PersistenceFailure(err.to_string())
    }
}

/// How the event append and the session transition are committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLogPolicy {
    /// Event and session change are committed together or not at all.
    #[default]
    Atomic,
    /// The event is kept even when the session transition is rejected.
    AuditFirst,
}

impl EventLogPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventLogPolicy::Atomic => "atomic",
            EventLogPolicy::AuditFirst => "audit_first",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "atomic" => Some(EventLogPolicy::Atomic),
            "audit_first" => Some(EventLogPolicy::AuditFirst),
            _ => None,
        }
    }
}

/// Outcome of a successful `record_event`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub event: ClockEvent,
    /// Session opened or closed by the event, if any.
    pub session: Option<WorkSession>,
}

/// Failure of `record_event`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    /// The session transition was refused.
    #[error("{reason}")]
    Rejected {
        reason: SessionError,
        /// Whether the event row was kept anyway (`AuditFirst`).
        event_retained: bool,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RecordError> for ClockError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Rejected { reason, .. } => reason.into(),
            RecordError::Store(e) => e.into(),
        }
    }
}

/// Looks up employee profiles.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;
}

/// Looks up the billing state of companies.
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn get_account(&self, company_id: Uuid) -> Result<Option<CompanyAccount>, StoreError>;
}

/// Looks up registered devices.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    async fn get_device(&self, id: Uuid) -> Result<Option<Device>, StoreError>;
}

/// Append-only event log plus keyed work session store.
///
/// Implementations must serialize `record_event` and `auto_close_session`
/// per (company, employee) so the open-session check and the write happen as
/// one unit.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Appends the event and applies its session transition.
    async fn record_event(
        &self,
        event: ClockEvent,
        policy: EventLogPolicy,
    ) -> Result<RecordedEvent, RecordError>;

    async fn find_open_session(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Option<WorkSession>, StoreError>;

    /// Sessions of a company, latest first.
    async fn list_sessions(
        &self,
        company_id: Uuid,
        employee_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<WorkSession>, StoreError>;

    /// Open sessions started strictly before `started_before`, oldest first.
    async fn find_stale_sessions(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<WorkSession>, StoreError>;

    /// Force-closes a session if it is still open.
    ///
    /// Returns `None` when the session was closed in the meantime.
    async fn auto_close_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkSession>, StoreError>;

    async fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError>;

    /// Connectivity check used by readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}
