//! Work session domain model.
//!
//! A work session is derived from clock events: an `in` event opens one and an
//! `out` event (or the stale session reaper) closes it. At most one session per
//! employee is open at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Closed,
    AutoClosed,
}

impl SessionStatus {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Open => "open",
            SessionStatus::Closed => "closed",
            SessionStatus::AutoClosed => "auto_closed",
        }
    }

    /// Parses from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(SessionStatus::Open),
            "closed" => Some(SessionStatus::Closed),
            "auto_closed" => Some(SessionStatus::AutoClosed),
            _ => None,
        }
    }
}

/// Worked minutes between two instants, rounded to the nearest minute and
/// never negative.
///
/// Both the manual `out` path and the reaper go through this function so the
/// two close paths always agree.
pub fn effective_minutes(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> i32 {
    let elapsed_ms = (ended_at - started_at).num_milliseconds();
    let minutes = (elapsed_ms as f64 / 60_000.0).round();
    minutes.clamp(0.0, i32::MAX as f64) as i32
}

/// A work session of one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub effective_minutes: Option<i32>,
}

impl WorkSession {
    /// A freshly opened session.
    pub fn open(company_id: Uuid, employee_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            employee_id,
            status: SessionStatus::Open,
            started_at,
            ended_at: None,
            effective_minutes: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Minutes elapsed since the session started, using the close arithmetic.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i32 {
        effective_minutes(self.started_at, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_effective_minutes_zero_length() {
        assert_eq!(effective_minutes(at(0), at(0)), 0);
    }

    #[test]
    fn test_effective_minutes_rounds_to_nearest() {
        assert_eq!(effective_minutes(at(0), at(29)), 0);
        assert_eq!(effective_minutes(at(0), at(30)), 1);
        assert_eq!(effective_minutes(at(0), at(89)), 1);
        assert_eq!(effective_minutes(at(0), at(90)), 2);
        assert_eq!(effective_minutes(at(0), at(8 * 3600)), 480);
    }

    #[test]
    fn test_effective_minutes_clamps_negative() {
        assert_eq!(effective_minutes(at(600), at(0)), 0);
    }

    #[test]
    fn test_effective_minutes_matches_millisecond_formula() {
        let start = at(0);
        for ms in [0_i64, 1, 29_999, 30_000, 59_999, 60_000, 3_599_999, 43_200_123] {
            let end = start + Duration::milliseconds(ms);
            let expected = (ms as f64 / 60_000.0).round() as i32;
            assert_eq!(effective_minutes(start, end), expected, "ms = {}", ms);
        }
    }

    #[test]
    fn test_session_status_from_str() {
        assert_eq!(SessionStatus::from_str("open"), Some(SessionStatus::Open));
        assert_eq!(
            SessionStatus::from_str("auto_closed"),
            Some(SessionStatus::AutoClosed)
        );
        assert_eq!(SessionStatus::from_str("paused"), None);
    }

    #[test]
    fn test_open_session() {
        let session = WorkSession::open(Uuid::new_v4(), Uuid::new_v4(), at(0));
        assert!(session.is_open());
        assert!(session.ended_at.is_none());
        assert!(session.effective_minutes.is_none());
        assert_eq!(session.elapsed_minutes(at(3600)), 60);
    }
}
