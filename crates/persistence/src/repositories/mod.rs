//! Repository implementations for database operations.

pub mod attendance;
pub mod company;
pub mod device;
pub mod profile;

pub use attendance::PgAttendanceStore;
pub use company::CompanyRepository;
pub use device::DeviceRepository;
pub use profile::ProfileRepository;
