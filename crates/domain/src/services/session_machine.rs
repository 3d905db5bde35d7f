//! Work session state machine.
//!
//! Pure transition logic. Stores call [`plan`] while holding the per-employee
//! lock and persist whatever change it returns.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::ClockError;
use crate::models::{effective_minutes, ClockAction, ClockEvent, SessionStatus, WorkSession};

/// Transition refused by the state machine.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("There is already an open work session")]
    AlreadyOpen,

    #[error("There is no open work session")]
    NoOpenSession,
}

impl From<SessionError> for ClockError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::AlreadyOpen => ClockError::SessionAlreadyOpen,
            SessionError::NoOpenSession => ClockError::NoOpenSession,
        }
    }
}

/// Session mutation to persist for an event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    Open(WorkSession),
    Close(WorkSession),
    Unchanged,
}

impl SessionChange {
    pub fn session(&self) -> Option<&WorkSession> {
        match self {
            SessionChange::Open(s) | SessionChange::Close(s) => Some(s),
            SessionChange::Unchanged => None,
        }
    }

    pub fn into_session(self) -> Option<WorkSession> {
        match self {
            SessionChange::Open(s) | SessionChange::Close(s) => Some(s),
            SessionChange::Unchanged => None,
        }
    }
}

/// Decides the session change for `event` given the employee's open session.
pub fn plan(
    event: &ClockEvent,
    current: Option<&WorkSession>,
) -> Result<SessionChange, SessionError> {
    let current = current.filter(|s| s.is_open());

    match event.action {
        ClockAction::In => match current {
            Some(_) => Err(SessionError::AlreadyOpen),
            None => Ok(SessionChange::Open(WorkSession::open(
                event.company_id,
                event.employee_id,
                event.happened_at,
            ))),
        },
        ClockAction::Out => match current {
            Some(session) => Ok(SessionChange::Close(close(
                session,
                event.happened_at,
                SessionStatus::Closed,
            ))),
            None => Err(SessionError::NoOpenSession),
        },
        ClockAction::BreakStart | ClockAction::BreakEnd => Ok(SessionChange::Unchanged),
    }
}

/// Closed copy of `session` ending at `now`.
///
/// Shared by the manual `out` path and the reaper.
pub fn close(session: &WorkSession, now: DateTime<Utc>, status: SessionStatus) -> WorkSession {
    WorkSession {
        status,
        ended_at: Some(now),
        effective_minutes: Some(effective_minutes(session.started_at, now)),
        ..session.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClockPayload;
    use chrono::Duration;
    use uuid::Uuid;

    fn event(action: ClockAction, at: DateTime<Utc>) -> ClockEvent {
        ClockEvent::from_payload(
            Uuid::nil(),
            Uuid::nil(),
            action,
            ClockPayload::default(),
            at,
        )
    }

    #[test]
    fn test_in_opens_session() {
        let now = Utc::now();
        let change = plan(&event(ClockAction::In, now), None).unwrap();
        match change {
            SessionChange::Open(s) => {
                assert_eq!(s.status, SessionStatus::Open);
                assert_eq!(s.started_at, now);
            }
            other => panic!("unexpected change: {:?}", other),
        }
    }

    #[test]
    fn test_in_with_open_session_is_rejected() {
        let now = Utc::now();
        let open = WorkSession::open(Uuid::nil(), Uuid::nil(), now);
        assert_eq!(
            plan(&event(ClockAction::In, now), Some(&open)),
            Err(SessionError::AlreadyOpen)
        );
    }

    #[test]
    fn test_out_without_session_is_rejected() {
        assert_eq!(
            plan(&event(ClockAction::Out, Utc::now()), None),
            Err(SessionError::NoOpenSession)
        );
    }

    #[test]
    fn test_out_closes_with_elapsed_minutes() {
        let start = Utc::now() - Duration::minutes(95);
        let open = WorkSession::open(Uuid::nil(), Uuid::nil(), start);
        let end = start + Duration::minutes(95);

        let closed = plan(&event(ClockAction::Out, end), Some(&open))
            .unwrap()
            .into_session()
            .unwrap();
        assert_eq!(closed.id, open.id);
        assert_eq!(closed.status, SessionStatus::Closed);
        assert_eq!(closed.ended_at, Some(end));
        assert_eq!(closed.effective_minutes, Some(95));
    }

    #[test]
    fn test_breaks_leave_sessions_alone() {
        let now = Utc::now();
        let open = WorkSession::open(Uuid::nil(), Uuid::nil(), now);
        assert_eq!(
            plan(&event(ClockAction::BreakStart, now), Some(&open)),
            Ok(SessionChange::Unchanged)
        );
        assert_eq!(
            plan(&event(ClockAction::BreakEnd, now), None),
            Ok(SessionChange::Unchanged)
        );
    }

    #[test]
    fn test_closed_session_does_not_count_as_open() {
        let now = Utc::now();
        let open = WorkSession::open(Uuid::nil(), Uuid::nil(), now);
        let closed = close(&open, now, SessionStatus::Closed);
        assert!(matches!(
            plan(&event(ClockAction::In, now), Some(&closed)),
            Ok(SessionChange::Open(_))
        ));
    }

    #[test]
    fn test_close_same_instant_is_zero_minutes() {
        let now = Utc::now();
        let open = WorkSession::open(Uuid::nil(), Uuid::nil(), now);
        let closed = close(&open, now, SessionStatus::AutoClosed);
        assert_eq!(closed.effective_minutes, Some(0));
        assert_eq!(closed.status, SessionStatus::AutoClosed);
    }
}
