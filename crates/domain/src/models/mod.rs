//! Domain models for attendance tracking.

pub mod alert;
pub mod clock_event;
pub mod company;
pub mod device;
pub mod profile;
pub mod work_session;

pub use alert::{Alert, AlertKind, AlertSeverity};
pub use clock_event::{ClockAction, ClockEvent, ClockPayload, ClockSource};
pub use company::{AccountStatus, CompanyAccount, Plan};
pub use device::{Coordinates, Device};
pub use profile::{Profile, Role};
pub use work_session::{effective_minutes, SessionStatus, WorkSession};
