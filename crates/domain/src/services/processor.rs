//! Attendance event processor.
//!
//! Validates a single clock event against the actor's permissions, the
//! company's billing state and the device geofence, then appends it and applies
//! its session transition through the [`AttendanceStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use validator::Validate;

use super::account_gate::{self, GateRequest};
use super::authorization::{self, Operation};
use super::geofence::{GeofenceOutcome, GeofenceValidator};
use super::notification::{self, NotificationSink};
use crate::error::ClockError;
use crate::models::{ClockAction, ClockEvent, ClockPayload, CompanyAccount, Profile, WorkSession};
use crate::ports::{
    AttendanceStore, CompanyDirectory, DeviceDirectory, EventLogPolicy, ProfileDirectory,
};

/// External collaborators of the processor.
#[derive(Clone)]
pub struct Collaborators {
    pub profiles: Arc<dyn ProfileDirectory>,
    pub companies: Arc<dyn CompanyDirectory>,
    pub devices: Arc<dyn DeviceDirectory>,
    pub store: Arc<dyn AttendanceStore>,
    pub notifier: Arc<dyn NotificationSink>,
}

#[derive(Debug, Clone, Copy)]
pub struct ProcessorSettings {
    pub geofence_radius_meters: f64,
    pub event_log_policy: EventLogPolicy,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            geofence_radius_meters: super::geofence::DEFAULT_GEOFENCE_RADIUS_METERS,
            event_log_policy: EventLogPolicy::default(),
        }
    }
}

/// Successful outcome of [`EventProcessor::process`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClockReceipt {
    pub event: ClockEvent,
    pub session: Option<WorkSession>,
}

#[derive(Clone)]
pub struct EventProcessor {
    collaborators: Collaborators,
    geofence: GeofenceValidator,
    event_log_policy: EventLogPolicy,
}

impl EventProcessor {
    pub fn new(collaborators: Collaborators, settings: ProcessorSettings) -> Self {
        Self {
            collaborators,
            geofence: GeofenceValidator::new(settings.geofence_radius_meters),
            event_log_policy: settings.event_log_policy,
        }
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub async fn process(
        &self,
        acting: &Profile,
        action: ClockAction,
        payload: ClockPayload,
    ) -> Result<ClockReceipt, ClockError> {
        self.process_at(acting, action, payload, Utc::now()).await
    }

    /// Processes one clock event as of `now`.
    ///
    /// Every check runs before the first write, so a refused event leaves no
    /// trace unless the audit-first policy keeps a rejected transition.
    pub async fn process_at(
        &self,
        acting: &Profile,
        action: ClockAction,
        payload: ClockPayload,
        now: DateTime<Utc>,
    ) -> Result<ClockReceipt, ClockError> {
        if !acting.is_active {
            return Err(ClockError::Disabled);
        }
        payload.validate()?;
        authorization::require_role(acting, Operation::RegisterClockEvent)?;

        let employee_id = authorization::resolve_clock_target(acting, payload.employee_id)?;
        let target = if employee_id == acting.id {
            acting.clone()
        } else {
            let target = self.collaborators.profiles.get_profile(employee_id).await?;
            authorization::check_target(acting, target)?
        };

        let account = self.company_account(acting).await?;
        account_gate::authorize(
            &account,
            GateRequest {
                action,
                source: payload.source(),
            },
        )
        .into_result()?;

        if let Some(device_id) = payload.device_id {
            let device = self.collaborators.devices.get_device(device_id).await?;
            let outcome =
                self.geofence
                    .validate(acting.company_id, device.as_ref(), payload.coordinates())?;
            if let GeofenceOutcome::Within { distance_meters } = outcome {
                debug!(%device_id, distance_meters, "Event within geofence");
            }
        }

        let event = ClockEvent::from_payload(acting.company_id, employee_id, action, payload, now);
        let recorded = self
            .collaborators
            .store
            .record_event(event, self.event_log_policy)
            .await?;

        info!(
            event_id = %recorded.event.id,
            employee_id = %employee_id,
            company_id = %acting.company_id,
            action = %action,
            source = %recorded.event.source,
            "Clock event registered"
        );

        notification::dispatch(
            self.collaborators.notifier.clone(),
            notification::clock_message(target.display_name(), action, recorded.event.source),
        );

        Ok(ClockReceipt {
            event: recorded.event,
            session: recorded.session,
        })
    }

    async fn company_account(&self, acting: &Profile) -> Result<CompanyAccount, ClockError> {
        match self
            .collaborators
            .companies
            .get_account(acting.company_id)
            .await?
        {
            Some(account) => Ok(account),
            None => {
                warn!(company_id = %acting.company_id, "Company not found, assuming active account");
                Ok(CompanyAccount::assumed_active(acting.company_id))
            }
        }
    }
}
