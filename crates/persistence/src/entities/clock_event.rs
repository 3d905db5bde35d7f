//! Clock event entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{ClockAction, ClockEvent, ClockSource};
use domain::ports::StoreError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the time_events table.
#[derive(Debug, Clone, FromRow)]
pub struct ClockEventEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Uuid,
    #[sqlx(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub device_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub happened_at: DateTime<Utc>,
}

impl TryFrom<ClockEventEntity> for ClockEvent {
    type Error = StoreError;

    fn try_from(entity: ClockEventEntity) -> Result<Self, Self::Error> {
        let action = ClockAction::from_db_str(&entity.event_type).ok_or_else(|| {
            StoreError::InvalidRow(format!("unknown event type '{}'", entity.event_type))
        })?;
        let source = ClockSource::from_str(&entity.source)
            .ok_or_else(|| StoreError::InvalidRow(format!("unknown source '{}'", entity.source)))?;

        Ok(Self {
            id: entity.id,
            company_id: entity.company_id,
            employee_id: entity.employee_id,
            action,
            source,
            device_id: entity.device_id,
            latitude: entity.latitude,
            longitude: entity.longitude,
            notes: entity.notes,
            photo_url: entity.photo_url,
            happened_at: entity.happened_at,
        })
    }
}
