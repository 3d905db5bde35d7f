//! Device ownership and geofence validation.

use uuid::Uuid;

use super::geo::distance_between;
use crate::error::ClockError;
use crate::models::{Coordinates, Device};

/// Maximum distance between a device and a clock event.
pub const DEFAULT_GEOFENCE_RADIUS_METERS: f64 = 100.0;

/// Result of a passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeofenceOutcome {
    /// Both sides had coordinates and the event was close enough.
    Within { distance_meters: f64 },
    /// One side had no usable coordinates, so the distance was not checked.
    Skipped,
}

#[derive(Debug, Clone, Copy)]
pub struct GeofenceValidator {
    pub radius_meters: f64,
}

impl Default for GeofenceValidator {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_GEOFENCE_RADIUS_METERS,
        }
    }
}

impl GeofenceValidator {
    pub fn new(radius_meters: f64) -> Self {
        Self { radius_meters }
    }

    /// Checks that `device` belongs to `company_id` and, when both sides carry
    /// coordinates, that the event happened within the radius.
    ///
    /// `device` is the directory lookup result; `None` means the device did not
    /// resolve. Partial coordinates skip the distance check.
    pub fn validate(
        &self,
        company_id: Uuid,
        device: Option<&Device>,
        event_coordinates: Option<Coordinates>,
    ) -> Result<GeofenceOutcome, ClockError> {
        let device = device
            .filter(|d| d.active && d.company_id == company_id)
            .ok_or(ClockError::DeviceNotOwned)?;

        let (Some(device_at), Some(event_at)) = (device.coordinates(), event_coordinates) else {
            return Ok(GeofenceOutcome::Skipped);
        };

        let distance_meters = distance_between(device_at, event_at);
        if distance_meters > self.radius_meters {
            return Err(ClockError::OutOfGeofence {
                distance_meters,
                limit_meters: self.radius_meters,
            });
        }

        Ok(GeofenceOutcome::Within { distance_meters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(company_id: Uuid, lat: Option<f64>, lon: Option<f64>) -> Device {
        Device {
            id: Uuid::new_v4(),
            company_id,
            name: "Entrance".to_string(),
            latitude: lat,
            longitude: lon,
            active: true,
        }
    }

    #[test]
    fn test_unknown_device_is_not_owned() {
        let validator = GeofenceValidator::default();
        assert_eq!(
            validator.validate(Uuid::new_v4(), None, None),
            Err(ClockError::DeviceNotOwned)
        );
    }

    #[test]
    fn test_foreign_device_is_not_owned() {
        let validator = GeofenceValidator::default();
        let d = device(Uuid::new_v4(), Some(41.0), Some(2.0));
        assert_eq!(
            validator.validate(Uuid::new_v4(), Some(&d), None),
            Err(ClockError::DeviceNotOwned)
        );
    }

    #[test]
    fn test_inactive_device_is_not_owned() {
        let validator = GeofenceValidator::default();
        let company_id = Uuid::new_v4();
        let mut d = device(company_id, None, None);
        d.active = false;
        assert_eq!(
            validator.validate(company_id, Some(&d), None),
            Err(ClockError::DeviceNotOwned)
        );
    }

    #[test]
    fn test_event_within_radius() {
        let validator = GeofenceValidator::default();
        let company_id = Uuid::new_v4();
        let d = device(company_id, Some(41.0), Some(2.0));

        let outcome = validator
            .validate(company_id, Some(&d), Some(Coordinates::new(41.0, 2.0009)))
            .unwrap();
        match outcome {
            GeofenceOutcome::Within { distance_meters } => assert!(distance_meters < 100.0),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_event_outside_radius_reports_distance() {
        let validator = GeofenceValidator::default();
        let company_id = Uuid::new_v4();
        let d = device(company_id, Some(41.0), Some(2.0));

        let err = validator
            .validate(company_id, Some(&d), Some(Coordinates::new(41.0, 2.002)))
            .unwrap_err();
        match err {
            ClockError::OutOfGeofence {
                distance_meters,
                limit_meters,
            } => {
                assert!((distance_meters - 167.8).abs() < 0.5);
                assert_eq!(limit_meters, 100.0);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_partial_coordinates_skip_distance_check() {
        let validator = GeofenceValidator::default();
        let company_id = Uuid::new_v4();
        let located = device(company_id, Some(41.0), Some(2.0));
        let half_located = device(company_id, Some(41.0), None);
        let far = Some(Coordinates::new(48.85, 2.35));

        assert_eq!(
            validator.validate(company_id, Some(&located), None),
            Ok(GeofenceOutcome::Skipped)
        );
        assert_eq!(
            validator.validate(company_id, Some(&half_located), far),
            Ok(GeofenceOutcome::Skipped)
        );
    }

    #[test]
    fn test_zero_coordinates_are_real_coordinates() {
        let validator = GeofenceValidator::default();
        let company_id = Uuid::new_v4();
        let d = device(company_id, Some(0.0), Some(0.0));

        let err = validator
            .validate(company_id, Some(&d), Some(Coordinates::new(0.0, 0.01)))
            .unwrap_err();
        assert_eq!(err.kind(), "out_of_geofence");
    }

    #[test]
    fn test_custom_radius() {
        let validator = GeofenceValidator::new(200.0);
        let company_id = Uuid::new_v4();
        let d = device(company_id, Some(41.0), Some(2.0));
        assert!(validator
            .validate(company_id, Some(&d), Some(Coordinates::new(41.0, 2.002)))
            .is_ok());
    }
}
