//! Company account domain model.
//!
//! Only the billing state of a company matters to attendance processing; the
//! rest of the company record is owned elsewhere.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Billing state of a company account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Grace,
    Suspended,
}

impl AccountStatus {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Grace => "grace",
            AccountStatus::Suspended => "suspended",
        }
    }

    /// Parses from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(AccountStatus::Active),
            "grace" => Some(AccountStatus::Grace),
            "suspended" => Some(AccountStatus::Suspended),
            _ => None,
        }
    }
}

/// Subscription plan. Only `pro` unlocks anything during the grace period, so
/// every other plan name collapses into `Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Standard,
    Pro,
}

impl Plan {
    /// Parses a plan name; unknown names are treated as `Standard`.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("pro") {
            Plan::Pro
        } else {
            Plan::Standard
        }
    }
}

/// Billing view of a company as returned by the company directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAccount {
    pub company_id: Uuid,
    pub status: AccountStatus,
    pub plan: Plan,
}

impl CompanyAccount {
    /// Account used when the directory has no record for the company.
    pub fn assumed_active(company_id: Uuid) -> Self {
        Self {
            company_id,
            status: AccountStatus::Active,
            plan: Plan::Standard,
        }
    }
}
