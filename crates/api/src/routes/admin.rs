//! Admin endpoint handlers.

use axum::{extract::State, Json};
use domain::services::authorization::{self, Operation};
use domain::services::ReaperReport;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ActingProfile;
use crate::middleware::record_sessions_auto_closed;

/// Run the stale session reaper now.
///
/// POST /api/v1/admin/work-sessions/auto-close
pub async fn auto_close_work_sessions(
    State(state): State<AppState>,
    ActingProfile(acting): ActingProfile,
) -> Result<Json<ReaperReport>, ApiError> {
    authorization::require_role(&acting, Operation::RunAutoClose)?;

    let report = state.reaper.run().await?;
    record_sessions_auto_closed(report.closed_count);

    info!(
        triggered_by = %acting.id,
        closed_count = report.closed_count,
        "Manual auto-close run finished"
    );

    Ok(Json(report))
}
