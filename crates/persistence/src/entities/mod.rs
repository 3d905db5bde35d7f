//! Database entity definitions.
//!
//! Entities map directly to database rows and convert into domain models.

pub mod clock_event;
pub mod company;
pub mod device;
pub mod profile;
pub mod work_session;

pub use clock_event::ClockEventEntity;
pub use company::CompanyAccountEntity;
pub use device::DeviceEntity;
pub use profile::ProfileEntity;
pub use work_session::WorkSessionEntity;
