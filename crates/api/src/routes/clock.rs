//! Clock event endpoint.

use axum::{body::Bytes, extract::State, Json};
use domain::models::{ClockEvent, ClockPayload, WorkSession};
use domain::ClockError;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ActingProfile, ClockActionPath};
use crate::middleware::record_clock_event;

/// Response for a registered clock event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockResponse {
    pub success: bool,
    pub event: ClockEvent,
    /// Session opened or closed by the event, if any.
    pub session: Option<WorkSession>,
}

/// Parses the request body.
///
/// A body that is not JSON at all counts as an empty payload. Well-formed JSON
/// that does not fit the payload shape is a validation failure.
fn parse_payload(body: &[u8]) -> Result<ClockPayload, ClockError> {
    let value = match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Null) | Err(_) => return Ok(ClockPayload::default()),
        Ok(value) => value,
    };

    serde_json::from_value(value).map_err(|e| ClockError::Validation(e.to_string()))
}

/// Register a clock event.
///
/// POST /api/v1/clock/:action
pub async fn register_clock_event(
    State(state): State<AppState>,
    ClockActionPath(action): ClockActionPath,
    ActingProfile(acting): ActingProfile,
    body: Bytes,
) -> Result<Json<ClockResponse>, ApiError> {
    let result = match parse_payload(&body) {
        Ok(payload) => state.processor.process(&acting, action, payload).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(receipt) => {
            record_clock_event(action.as_str(), "ok");
            Ok(Json(ClockResponse {
                success: true,
                event: receipt.event,
                session: receipt.session,
            }))
        }
        Err(e) => {
            record_clock_event(action.as_str(), e.kind());
            Err(e.into())
        }
    }
}
