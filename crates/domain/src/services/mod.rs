//! Domain services for attendance processing.
//!
//! Services contain business logic that operates on domain models.

pub mod account_gate;
pub mod authorization;
pub mod geo;
pub mod geofence;
pub mod notification;
pub mod processor;
pub mod reaper;
pub mod session_machine;

pub use account_gate::{authorize, DenyReason, GateDecision, GateRequest};
pub use authorization::Operation;
pub use geo::distance_meters;
pub use geofence::{GeofenceOutcome, GeofenceValidator, DEFAULT_GEOFENCE_RADIUS_METERS};
pub use notification::{
    LoggingNotificationSink, MockNotificationSink, NotificationError, NotificationSink,
};
pub use processor::{ClockReceipt, Collaborators, EventProcessor, ProcessorSettings};
pub use reaper::{ReaperReport, StaleSessionReaper};
pub use session_machine::{SessionChange, SessionError};
