//! Failure taxonomy of the attendance event processor.
//!
//! Every domain violation is converted into a `ClockError` at the processor
//! boundary. The API layer renders it as `{ success: false, errorKind, message }`.

use thiserror::Error;

/// Typed failure of a clock operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClockError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Your profile is disabled")]
    Disabled,

    #[error("Not allowed: {0}")]
    ForbiddenActor(String),

    #[error("The company account is suspended")]
    AccountSuspended,

    #[error("Kiosk check-ins require the Pro plan while the account is in its grace period")]
    GracePlanRestricted,

    #[error("The device does not belong to your company")]
    DeviceNotOwned,

    #[error(
        "You are outside the allowed area. Distance: {distance_meters:.0}m (maximum: {limit_meters:.0}m)"
    )]
    OutOfGeofence {
        distance_meters: f64,
        limit_meters: f64,
    },

    #[error("There is already an open work session")]
    SessionAlreadyOpen,

    #[error("There is no open work session")]
    NoOpenSession,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl ClockError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ClockError::Unauthenticated => "unauthenticated",
            ClockError::Disabled => "disabled",
            ClockError::ForbiddenActor(_) => "forbidden_actor",
            ClockError::AccountSuspended => "account_suspended",
            ClockError::GracePlanRestricted => "grace_plan_restricted",
            ClockError::DeviceNotOwned => "device_not_owned",
            ClockError::OutOfGeofence { .. } => "out_of_geofence",
            ClockError::SessionAlreadyOpen => "session_already_open",
            ClockError::NoOpenSession => "no_open_session",
            ClockError::Validation(_) => "validation",
            ClockError::PersistenceFailure(_) => "persistence_failure",
        }
    }
}

impl From<validator::ValidationErrors> for ClockError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let messages: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect();
        fields.sort();
        ClockError::Validation(fields.join("; "))
    }
}
