//! Custom Axum extractors.

pub mod acting_profile;
pub mod clock_action;

pub use acting_profile::ActingProfile;
pub use clock_action::ClockActionPath;
