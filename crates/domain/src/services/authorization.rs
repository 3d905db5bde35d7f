//! Static role permissions for attendance operations.

use uuid::Uuid;

use crate::error::ClockError;
use crate::models::{Profile, Role};

/// Operations guarded by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RegisterClockEvent,
    ViewTeamSessions,
    RunAutoClose,
}

impl Operation {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Operation::RegisterClockEvent => {
                &[Role::Worker, Role::Manager, Role::Admin, Role::Owner]
            }
            Operation::ViewTeamSessions => {
                &[Role::Manager, Role::Admin, Role::Owner, Role::Auditor]
            }
            Operation::RunAutoClose => &[Role::SuperAdmin],
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    fn describe(&self) -> &'static str {
        match self {
            Operation::RegisterClockEvent => "register clock events",
            Operation::ViewTeamSessions => "view other employees' sessions",
            Operation::RunAutoClose => "run the session auto-close",
        }
    }
}

/// Fails with `ForbiddenActor` unless the profile's role may perform `op`.
pub fn require_role(profile: &Profile, op: Operation) -> Result<(), ClockError> {
    if op.allows(profile.role) {
        Ok(())
    } else {
        Err(ClockError::ForbiddenActor(format!(
            "role '{}' may not {}",
            profile.role,
            op.describe()
        )))
    }
}

/// Resolves the employee a clock event is registered for.
///
/// Workers may only clock themselves.
pub fn resolve_clock_target(acting: &Profile, requested: Option<Uuid>) -> Result<Uuid, ClockError> {
    let target = requested.unwrap_or(acting.id);
    if target != acting.id && acting.role == Role::Worker {
        return Err(ClockError::ForbiddenActor(
            "workers may only register their own events".to_string(),
        ));
    }
    Ok(target)
}

/// Resolves whose sessions a profile wants to read.
pub fn resolve_view_target(acting: &Profile, requested: Option<Uuid>) -> Result<Uuid, ClockError> {
    let target = requested.unwrap_or(acting.id);
    if target != acting.id {
        require_role(acting, Operation::ViewTeamSessions)?;
    }
    Ok(target)
}

/// Checks a looked-up target profile when acting on someone else.
pub fn check_target(acting: &Profile, target: Option<Profile>) -> Result<Profile, ClockError> {
    match target {
        Some(t) if t.company_id == acting.company_id && t.is_active => Ok(t),
        Some(t) if t.company_id == acting.company_id => Err(ClockError::ForbiddenActor(
            "the target employee is disabled".to_string(),
        )),
        _ => Err(ClockError::ForbiddenActor(
            "the target employee is not part of your company".to_string(),
        )),
    }
}
