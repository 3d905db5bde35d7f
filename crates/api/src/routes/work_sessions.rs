//! Work session read endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{Profile, WorkSession};
use domain::services::authorization::{self, Operation};
use domain::ClockError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ActingProfile;

/// Maximum sessions per query.
const MAX_SESSIONS_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsQuery {
    pub employee_id: Option<Uuid>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSessionQuery {
    pub employee_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSessionsResponse {
    pub sessions: Vec<WorkSession>,
    pub count: usize,
}

/// Whose sessions a listing covers; `None` means the whole company.
fn list_scope(acting: &Profile, requested: Option<Uuid>) -> Result<Option<Uuid>, ClockError> {
    match requested {
        Some(id) => authorization::resolve_view_target(acting, Some(id)).map(Some),
        None if Operation::ViewTeamSessions.allows(acting.role) => Ok(None),
        None => Ok(Some(acting.id)),
    }
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(MAX_SESSIONS_LIMIT).clamp(1, MAX_SESSIONS_LIMIT)
}

/// List work sessions of the acting company, latest first.
///
/// GET /api/v1/work-sessions?employeeId=&limit=
///
/// Without `employeeId`, team viewers see every employee and everyone else
/// sees their own sessions.
pub async fn list_work_sessions(
    State(state): State<AppState>,
    ActingProfile(acting): ActingProfile,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<ListSessionsResponse>, ApiError> {
    let employee_id = list_scope(&acting, query.employee_id)?;
    let limit = clamp_limit(query.limit);

    let sessions = state
        .processor
        .collaborators()
        .store
        .list_sessions(acting.company_id, employee_id, limit)
        .await?;

    Ok(Json(ListSessionsResponse {
        count: sessions.len(),
        sessions,
    }))
}

/// The open session of an employee, or `null`.
///
/// GET /api/v1/work-sessions/current?employeeId=
pub async fn current_work_session(
    State(state): State<AppState>,
    ActingProfile(acting): ActingProfile,
    Query(query): Query<CurrentSessionQuery>,
) -> Result<Json<Option<WorkSession>>, ApiError> {
    let employee_id = authorization::resolve_view_target(&acting, query.employee_id)?;

    let session = state
        .processor
        .collaborators()
        .store
        .find_open_session(acting.company_id, employee_id)
        .await?;

    Ok(Json(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::Role;

    fn profile(role: Role) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            role,
            full_name: None,
            is_active: true,
        }
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 100);
        assert_eq!(clamp_limit(Some(20)), 20);
        assert_eq!(clamp_limit(Some(1000)), 100);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
    }

    #[test]
    fn test_list_scope_worker_sees_self() {
        let worker = profile(Role::Worker);
        assert_eq!(list_scope(&worker, None), Ok(Some(worker.id)));
        assert_eq!(list_scope(&worker, Some(worker.id)), Ok(Some(worker.id)));
        assert!(list_scope(&worker, Some(Uuid::new_v4())).is_err());
    }

    #[test]
    fn test_list_scope_team_viewers() {
        let manager = profile(Role::Manager);
        assert_eq!(list_scope(&manager, None), Ok(None));

        let auditor = profile(Role::Auditor);
        let other = Uuid::new_v4();
        assert_eq!(list_scope(&auditor, Some(other)), Ok(Some(other)));
    }
}
