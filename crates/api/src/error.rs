use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::ports::StoreError;
use domain::ClockError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Failure body shared by every endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error_kind: String,
    pub message: String,
}

/// HTTP status for a clock failure.
pub fn clock_status(err: &ClockError) -> StatusCode {
    match err {
        ClockError::Unauthenticated => StatusCode::UNAUTHORIZED,
        ClockError::Disabled | ClockError::ForbiddenActor(_) | ClockError::DeviceNotOwned => {
            StatusCode::FORBIDDEN
        }
        ClockError::AccountSuspended | ClockError::GracePlanRestricted => {
            StatusCode::PAYMENT_REQUIRED
        }
        ClockError::OutOfGeofence { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ClockError::SessionAlreadyOpen | ClockError::NoOpenSession => StatusCode::CONFLICT,
        ClockError::Validation(_) => StatusCode::BAD_REQUEST,
        ClockError::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_kind, message) = match &self {
            ApiError::Clock(err) => {
                if let ClockError::PersistenceFailure(msg) = err {
                    tracing::error!("Persistence failure: {}", msg);
                }
                (clock_status(err), err.kind(), err.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
        };

        let body = ErrorBody {
            success: false,
            error_kind: error_kind.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Clock(err.into())
    }
}
