//! Work session entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{SessionStatus, WorkSession};
use domain::ports::StoreError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the work_sessions table.
#[derive(Debug, Clone, FromRow)]
pub struct WorkSessionEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub effective_minutes: Option<i32>,
}

impl TryFrom<WorkSessionEntity> for WorkSession {
    type Error = StoreError;

    fn try_from(entity: WorkSessionEntity) -> Result<Self, Self::Error> {
        let status = SessionStatus::from_str(&entity.status).ok_or_else(|| {
            StoreError::InvalidRow(format!(
                "work session {} has unknown status '{}'",
                entity.id, entity.status
            ))
        })?;

        Ok(Self {
            id: entity.id,
            company_id: entity.company_id,
            employee_id: entity.employee_id,
            status,
            started_at: entity.started_at,
            ended_at: entity.ended_at,
            effective_minutes: entity.effective_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_entity_to_domain() {
        let entity = WorkSessionEntity {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            status: "auto_closed".to_string(),
            started_at: Utc::now(),
            ended_at: Some(Utc::now()),
            effective_minutes: Some(721),
        };
        let session = WorkSession::try_from(entity.clone()).unwrap();
        assert_eq!(session.id, entity.id);
        assert_eq!(session.status, SessionStatus::AutoClosed);
        assert_eq!(session.effective_minutes, Some(721));
    }
}
