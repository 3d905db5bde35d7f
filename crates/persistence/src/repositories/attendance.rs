//! Clock event log and work session store.
//!
//! Every write for one employee runs in a transaction that first takes a
//! transaction-scoped advisory lock on the (company, employee) key and then
//! re-reads the open session with `FOR UPDATE`. The partial unique index on
//! open sessions backs this up at the schema level.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{Alert, ClockEvent, SessionStatus, WorkSession};
use domain::ports::{AttendanceStore, EventLogPolicy, RecordError, RecordedEvent, StoreError};
use domain::services::session_machine::{self, SessionChange, SessionError};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::{ClockEventEntity, WorkSessionEntity};
use crate::metrics::QueryTimer;
use crate::store_error;

const SESSION_COLUMNS: &str =
    "id, company_id, employee_id, status, started_at, ended_at, effective_minutes";

/// Postgres unique violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres implementation of [`AttendanceStore`].
#[derive(Clone)]
pub struct PgAttendanceStore {
    pool: PgPool,
}

impl PgAttendanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn record_in_transaction(
        &self,
        event: ClockEvent,
        policy: EventLogPolicy,
    ) -> Result<RecordedEvent, RecordError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        lock_employee(&mut *tx, event.company_id, event.employee_id)
            .await
            .map_err(store_error)?;

        let current = select_open_for_update(&mut *tx, event.company_id, event.employee_id)
            .await
            .map_err(store_error)?
            .map(to_session)
            .transpose()?;

        let change = match session_machine::plan(&event, current.as_ref()) {
            Ok(change) => change,
            Err(reason) => {
                let event_retained = retains_rejected_event(policy);
                if event_retained {
                    insert_event(&mut *tx, &event).await.map_err(store_error)?;
                    tx.commit().await.map_err(store_error)?;
                } else {
                    tx.rollback().await.map_err(store_error)?;
                }
                return Err(RecordError::Rejected {
                    reason,
                    event_retained,
                });
            }
        };

        let stored = insert_event(&mut *tx, &event).await.map_err(store_error)?;
        let write = match &change {
            SessionChange::Open(s) => insert_session(&mut *tx, s).await,
            SessionChange::Close(s) => update_closed_session(&mut *tx, s).await,
            SessionChange::Unchanged => Ok(()),
        };
        match write {
            Ok(()) => {}
            Err(e) if is_unique_violation(&e) => {
                warn!(employee_id = %event.employee_id, "Open session index rejected a second open session");
                // The failed statement aborted the transaction along with its event row
                tx.rollback().await.map_err(store_error)?;
                let event_retained = retains_rejected_event(policy);
                if event_retained {
                    let mut conn = self.pool.acquire().await.map_err(store_error)?;
                    insert_event(&mut *conn, &event).await.map_err(store_error)?;
                }
                return Err(RecordError::Rejected {
                    reason: SessionError::AlreadyOpen,
                    event_retained,
                });
            }
            Err(e) => return Err(store_error(e).into()),
        }

        tx.commit().await.map_err(store_error)?;
        debug!(event_id = %stored.id, "Clock event stored");

        Ok(RecordedEvent {
            event: ClockEvent::try_from(stored)?,
            session: change.into_session(),
        })
    }

    async fn auto_close_in_transaction(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkSession>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let key: Option<(Uuid, Uuid)> =
            sqlx::query_as("SELECT company_id, employee_id FROM work_sessions WHERE id = $1")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(store_error)?;
        let Some((company_id, employee_id)) = key else {
            return Ok(None);
        };

        lock_employee(&mut *tx, company_id, employee_id)
            .await
            .map_err(store_error)?;
        let current = select_open_for_update(&mut *tx, company_id, employee_id)
            .await
            .map_err(store_error)?
            .map(to_session)
            .transpose()?
            .filter(|s| s.id == session_id);

        let Some(current) = current else {
            tx.rollback().await.map_err(store_error)?;
            return Ok(None);
        };

        let closed = session_machine::close(&current, now, SessionStatus::AutoClosed);
        update_closed_session(&mut *tx, &closed)
            .await
            .map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;
        Ok(Some(closed))
    }
}

/// Whether a refused event is still written to the log.
fn retains_rejected_event(policy: EventLogPolicy) -> bool {
    policy == EventLogPolicy::AuditFirst
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

fn to_session(entity: WorkSessionEntity) -> Result<WorkSession, StoreError> {
    WorkSession::try_from(entity)
}

/// Serializes writers of one employee until the transaction ends.
async fn lock_employee(
    conn: &mut PgConnection,
    company_id: Uuid,
    employee_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("{}:{}", company_id, employee_id))
        .execute(conn)
        .await?;
    Ok(())
}

async fn select_open_for_update(
    conn: &mut PgConnection,
    company_id: Uuid,
    employee_id: Uuid,
) -> Result<Option<WorkSessionEntity>, sqlx::Error> {
    sqlx::query_as::<_, WorkSessionEntity>(&format!(
        r#"
        SELECT {SESSION_COLUMNS}
        FROM work_sessions
        WHERE company_id = $1 AND employee_id = $2 AND status = 'open'
        FOR UPDATE
        "#
    ))
    .bind(company_id)
    .bind(employee_id)
    .fetch_optional(conn)
    .await
}

async fn insert_event(
    conn: &mut PgConnection,
    event: &ClockEvent,
) -> Result<ClockEventEntity, sqlx::Error> {
    sqlx::query_as::<_, ClockEventEntity>(
        r#"
        INSERT INTO time_events
            (id, company_id, employee_id, type, source, device_id,
             latitude, longitude, notes, photo_url, happened_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, company_id, employee_id, type, source, device_id,
                  latitude, longitude, notes, photo_url, happened_at
        "#,
    )
    .bind(event.id)
    .bind(event.company_id)
    .bind(event.employee_id)
    .bind(event.action.as_db_str())
    .bind(event.source.as_str())
    .bind(event.device_id)
    .bind(event.latitude)
    .bind(event.longitude)
    .bind(event.notes.as_deref())
    .bind(event.photo_url.as_deref())
    .bind(event.happened_at)
    .fetch_one(conn)
    .await
}

async fn insert_session(conn: &mut PgConnection, session: &WorkSession) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO work_sessions (id, company_id, employee_id, status, started_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(session.id)
    .bind(session.company_id)
    .bind(session.employee_id)
    .bind(session.status.as_str())
    .bind(session.started_at)
    .execute(conn)
    .await?;
    Ok(())
}

async fn update_closed_session(
    conn: &mut PgConnection,
    session: &WorkSession,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE work_sessions
        SET status = $2, ended_at = $3, effective_minutes = $4, updated_at = NOW()
        WHERE id = $1 AND status = 'open'
        "#,
    )
    .bind(session.id)
    .bind(session.status.as_str())
    .bind(session.ended_at)
    .bind(session.effective_minutes)
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn record_event(
        &self,
        event: ClockEvent,
        policy: EventLogPolicy,
    ) -> Result<RecordedEvent, RecordError> {
        let timer = QueryTimer::new("record_clock_event");
        timer.finish(self.record_in_transaction(event, policy).await)
    }

    async fn find_open_session(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Option<WorkSession>, StoreError> {
        let timer = QueryTimer::new("find_open_session");
        let result = sqlx::query_as::<_, WorkSessionEntity>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM work_sessions
            WHERE company_id = $1 AND employee_id = $2 AND status = 'open'
            "#
        ))
        .bind(company_id)
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await;

        timer
            .finish(result)
            .map_err(store_error)?
            .map(to_session)
            .transpose()
    }

    async fn list_sessions(
        &self,
        company_id: Uuid,
        employee_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<WorkSession>, StoreError> {
        let timer = QueryTimer::new("list_work_sessions");
        let result = sqlx::query_as::<_, WorkSessionEntity>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM work_sessions
            WHERE company_id = $1 AND ($2::uuid IS NULL OR employee_id = $2)
            ORDER BY started_at DESC
            LIMIT $3
            "#
        ))
        .bind(company_id)
        .bind(employee_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;

        timer
            .finish(result)
            .map_err(store_error)?
            .into_iter()
            .map(to_session)
            .collect()
    }

    async fn find_stale_sessions(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<WorkSession>, StoreError> {
        let timer = QueryTimer::new("find_stale_sessions");
        let result = sqlx::query_as::<_, WorkSessionEntity>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM work_sessions
            WHERE status = 'open' AND started_at < $1
            ORDER BY started_at ASC
            LIMIT $2
            "#
        ))
        .bind(started_before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;

        timer
            .finish(result)
            .map_err(store_error)?
            .into_iter()
            .map(to_session)
            .collect()
    }

    async fn auto_close_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkSession>, StoreError> {
        let timer = QueryTimer::new("auto_close_session");
        timer.finish(self.auto_close_in_transaction(session_id, now).await)
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        let timer = QueryTimer::new("insert_alert");
        let result = sqlx::query(
            r#"
            INSERT INTO alerts (id, company_id, kind, severity, entity_ref, payload, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(alert.id)
        .bind(alert.company_id)
        .bind(alert.kind.as_str())
        .bind(alert.severity.as_str())
        .bind(alert.entity_ref)
        .bind(&alert.payload)
        .bind(alert.created_at)
        .execute(&self.pool)
        .await;

        timer.finish(result).map_err(store_error)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_event_retention_follows_policy() {
        assert!(retains_rejected_event(EventLogPolicy::AuditFirst));
        assert!(!retains_rejected_event(EventLogPolicy::Atomic));
    }

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn test_session_columns_match_entity() {
        for column in [
            "id",
            "company_id",
            "employee_id",
            "status",
            "started_at",
            "ended_at",
            "effective_minutes",
        ] {
            assert!(SESSION_COLUMNS.contains(column), "missing {}", column);
        }
    }

    #[test]
    fn test_to_session_rejects_unknown_status() {
        let entity = WorkSessionEntity {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            status: "paused".to_string(),
            started_at: Utc::now(),
            ended_at: None,
            effective_minutes: None,
        };
        assert!(matches!(to_session(entity), Err(StoreError::InvalidRow(_))));
    }
}
