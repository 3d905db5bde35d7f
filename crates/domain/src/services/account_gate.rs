//! Billing gate for clock events.

use crate::error::ClockError;
use crate::models::{AccountStatus, ClockAction, ClockSource, CompanyAccount, Plan};

/// The part of a clock request the gate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateRequest {
    pub action: ClockAction,
    pub source: ClockSource,
}

/// Why the gate refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    AccountSuspended,
    GracePlanRestricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny(DenyReason),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }

    pub fn into_result(self) -> Result<(), ClockError> {
        match self {
            GateDecision::Allow => Ok(()),
            GateDecision::Deny(DenyReason::AccountSuspended) => Err(ClockError::AccountSuspended),
            GateDecision::Deny(DenyReason::GracePlanRestricted) => {
                Err(ClockError::GracePlanRestricted)
            }
        }
    }
}

/// Decides whether `account` may register the requested clock event.
///
/// Suspended accounts may not clock at all. During the grace period kiosk
/// check-ins stay available only on the Pro plan.
pub fn authorize(account: &CompanyAccount, request: GateRequest) -> GateDecision {
    match account.status {
        AccountStatus::Active => GateDecision::Allow,
        AccountStatus::Suspended => GateDecision::Deny(DenyReason::AccountSuspended),
        AccountStatus::Grace => {
            if request.source == ClockSource::Kiosk && account.plan != Plan::Pro {
                GateDecision::Deny(DenyReason::GracePlanRestricted)
            } else {
                GateDecision::Allow
            }
        }
    }
}
