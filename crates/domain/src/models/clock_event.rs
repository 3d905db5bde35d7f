//! Clock event domain model.
//!
//! Clock events are immutable facts. They are appended once and never updated
//! or deleted; the event log is the audit record of attendance.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::device::Coordinates;

/// Kind of clock event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockAction {
    In,
    Out,
    BreakStart,
    BreakEnd,
}

impl ClockAction {
    /// Name used in URLs and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockAction::In => "in",
            ClockAction::Out => "out",
            ClockAction::BreakStart => "break_start",
            ClockAction::BreakEnd => "break_end",
        }
    }

    /// Parses the name used in URLs and API payloads.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in" => Some(ClockAction::In),
            "out" => Some(ClockAction::Out),
            "break_start" => Some(ClockAction::BreakStart),
            "break_end" => Some(ClockAction::BreakEnd),
            _ => None,
        }
    }

    /// Converts to the event type stored in the `time_events` table.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ClockAction::In => "IN",
            ClockAction::Out => "OUT",
            ClockAction::BreakStart => "BREAK_START",
            ClockAction::BreakEnd => "BREAK_END",
        }
    }

    /// Parses the event type stored in the `time_events` table.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "IN" => Some(ClockAction::In),
            "OUT" => Some(ClockAction::Out),
            "BREAK_START" => Some(ClockAction::BreakStart),
            "BREAK_END" => Some(ClockAction::BreakEnd),
            _ => None,
        }
    }

    /// Whether this action opens or closes a work session.
    pub fn changes_session(&self) -> bool {
        matches!(self, ClockAction::In | ClockAction::Out)
    }
}

impl std::fmt::Display for ClockAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Channel through which a clock event was submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockSource {
    #[default]
    Web,
    Mobile,
    Kiosk,
}

impl ClockSource {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockSource::Web => "web",
            ClockSource::Mobile => "mobile",
            ClockSource::Kiosk => "kiosk",
        }
    }

    /// Parses from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "web" => Some(ClockSource::Web),
            "mobile" => Some(ClockSource::Mobile),
            "kiosk" => Some(ClockSource::Kiosk),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request payload for registering a clock event.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClockPayload {
    /// Employee the event is registered for; defaults to the acting profile.
    pub employee_id: Option<Uuid>,

    pub device_id: Option<Uuid>,

    #[serde(default, deserialize_with = "lenient_coordinate")]
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient_coordinate")]
    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: Option<f64>,

    #[validate(length(max = 280, message = "Note must be 280 characters or fewer"))]
    pub notes: Option<String>,

    #[validate(url(message = "Photo URL must be a valid URL"))]
    pub photo_url: Option<String>,

    pub source: Option<ClockSource>,
}

/// Reads a coordinate sent as a number or a numeric string.
///
/// Browser forms submit `""` for an empty field, which counts as absent.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCoordinate {
        Number(f64),
        Text(String),
    }

    let text = match Option::<RawCoordinate>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawCoordinate::Number(value)) => return Ok(Some(value)),
        Some(RawCoordinate::Text(text)) => text,
    };

    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid coordinate '{}'", text)))
}

impl ClockPayload {
    /// Location the event was submitted from, if both halves were sent.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }

    /// Submission channel, `web` when not specified.
    pub fn source(&self) -> ClockSource {
        self.source.unwrap_or_default()
    }
}

/// A recorded clock event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockEvent {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub action: ClockAction,
    pub source: ClockSource,
    pub device_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub happened_at: DateTime<Utc>,
}

impl ClockEvent {
    /// Builds a new event from a validated payload.
    pub fn from_payload(
        company_id: Uuid,
        employee_id: Uuid,
        action: ClockAction,
        payload: ClockPayload,
        happened_at: DateTime<Utc>,
    ) -> Self {
        let source = payload.source();
        Self {
            id: Uuid::new_v4(),
            company_id,
            employee_id,
            action,
            source,
            device_id: payload.device_id,
            latitude: payload.latitude,
            longitude: payload.longitude,
            notes: payload.notes,
            photo_url: payload.photo_url,
            happened_at,
        }
    }
}
