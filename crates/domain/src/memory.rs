//! In-memory collaborators.
//!
//! Used by the test suites and by local runs without a database. The
//! attendance store serializes writes per (company, employee) with a keyed
//! async mutex map; different employees never contend. An entry lives only
//! while some task holds or waits on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    Alert, ClockEvent, CompanyAccount, Device, Profile, SessionStatus, WorkSession,
};
use crate::ports::{
    AttendanceStore, CompanyDirectory, DeviceDirectory, EventLogPolicy, ProfileDirectory,
    RecordError, RecordedEvent, StoreError,
};
use crate::services::session_machine::{self, SessionChange};

/// Profiles, company accounts and devices kept in maps.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    profiles: RwLock<HashMap<Uuid, Profile>>,
    companies: RwLock<HashMap<Uuid, CompanyAccount>>,
    devices: RwLock<HashMap<Uuid, Device>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_profile(&self, profile: Profile) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile.id, profile);
    }

    pub fn insert_company(&self, account: CompanyAccount) {
        self.companies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account.company_id, account);
    }

    pub fn insert_device(&self, device: Device) {
        self.devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(device.id, device);
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryDirectory {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned())
    }
}

#[async_trait]
impl CompanyDirectory for InMemoryDirectory {
    async fn get_account(&self, company_id: Uuid) -> Result<Option<CompanyAccount>, StoreError> {
        Ok(self
            .companies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&company_id)
            .cloned())
    }
}

#[async_trait]
impl DeviceDirectory for InMemoryDirectory {
    async fn get_device(&self, id: Uuid) -> Result<Option<Device>, StoreError> {
        Ok(self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned())
    }
}

type EmployeeKey = (Uuid, Uuid);

#[derive(Debug, Default)]
struct StoreState {
    events: Vec<ClockEvent>,
    sessions: HashMap<Uuid, WorkSession>,
    alerts: Vec<Alert>,
}

impl StoreState {
    fn open_session(&self, company_id: Uuid, employee_id: Uuid) -> Option<&WorkSession> {
        self.sessions.values().find(|s| {
            s.company_id == company_id && s.employee_id == employee_id && s.is_open()
        })
    }
}

/// Event log and session store kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    state: Mutex<StoreState>,
    locks: RwLock<HashMap<EmployeeKey, Arc<tokio::sync::Mutex<()>>>>,
    fail_alerts: bool,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose alert writes always fail.
    pub fn failing_alerts() -> Self {
        Self {
            fail_alerts: true,
            ..Self::default()
        }
    }

    /// Snapshot of the event log in append order.
    pub fn events(&self) -> Vec<ClockEvent> {
        self.state().events.clone()
    }

    /// Snapshot of all sessions, oldest first.
    pub fn sessions(&self) -> Vec<WorkSession> {
        let mut sessions: Vec<WorkSession> = self.state().sessions.values().cloned().collect();
        sessions.sort_by_key(|s| s.started_at);
        sessions
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.state().alerts.clone()
    }

    /// Inserts a session directly, bypassing the event log.
    pub fn seed_session(&self, session: WorkSession) {
        self.state().sessions.insert(session.id, session);
    }

    fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get or create the mutex guarding one employee.
    fn employee_lock(&self, key: EmployeeKey) -> Arc<tokio::sync::Mutex<()>> {
        {
            let locks = self.locks.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(lock) = locks.get(&key) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().unwrap_or_else(PoisonError::into_inner);
        locks.entry(key).or_default().clone()
    }

    /// Drops the employee's mutex from the map once no other task holds it.
    fn release_employee_lock(&self, key: EmployeeKey, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.write().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one in `lock`
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&key);
        }
    }

    fn record_locked(
        &self,
        event: ClockEvent,
        policy: EventLogPolicy,
    ) -> Result<RecordedEvent, RecordError> {
        let mut state = self.state();
        let current = state
            .open_session(event.company_id, event.employee_id)
            .cloned();

        let change = match session_machine::plan(&event, current.as_ref()) {
            Ok(change) => change,
            Err(reason) => {
                let event_retained = policy == EventLogPolicy::AuditFirst;
                if event_retained {
                    state.events.push(event);
                }
                return Err(RecordError::Rejected {
                    reason,
                    event_retained,
                });
            }
        };

        state.events.push(event.clone());
        if let SessionChange::Open(s) | SessionChange::Close(s) = &change {
            state.sessions.insert(s.id, s.clone());
        }

        debug!(event_id = %event.id, action = %event.action, "Recorded clock event");
        Ok(RecordedEvent {
            event,
            session: change.into_session(),
        })
    }

    fn auto_close_locked(&self, session_id: Uuid, now: DateTime<Utc>) -> Option<WorkSession> {
        let mut state = self.state();
        let current = state.sessions.get(&session_id).filter(|s| s.is_open())?;

        let closed = session_machine::close(current, now, SessionStatus::AutoClosed);
        state.sessions.insert(closed.id, closed.clone());
        Some(closed)
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn record_event(
        &self,
        event: ClockEvent,
        policy: EventLogPolicy,
    ) -> Result<RecordedEvent, RecordError> {
        let key = (event.company_id, event.employee_id);
        let lock = self.employee_lock(key);
        let result = {
            let _guard = lock.lock().await;
            self.record_locked(event, policy)
        };
        self.release_employee_lock(key, lock);
        result
    }

    async fn find_open_session(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Option<WorkSession>, StoreError> {
        Ok(self.state().open_session(company_id, employee_id).cloned())
    }

    async fn list_sessions(
        &self,
        company_id: Uuid,
        employee_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<WorkSession>, StoreError> {
        let state = self.state();
        let mut sessions: Vec<WorkSession> = state
            .sessions
            .values()
            .filter(|s| s.company_id == company_id)
            .filter(|s| employee_id.map_or(true, |id| s.employee_id == id))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sessions.truncate(limit.max(0) as usize);
        Ok(sessions)
    }

    async fn find_stale_sessions(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<WorkSession>, StoreError> {
        let state = self.state();
        let mut sessions: Vec<WorkSession> = state
            .sessions
            .values()
            .filter(|s| s.is_open() && s.started_at < started_before)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.started_at);
        sessions.truncate(limit.max(0) as usize);
        Ok(sessions)
    }

    async fn auto_close_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkSession>, StoreError> {
        let key = match self.state().sessions.get(&session_id) {
            Some(s) => (s.company_id, s.employee_id),
            None => return Ok(None),
        };

        let lock = self.employee_lock(key);
        let closed = {
            let _guard = lock.lock().await;
            self.auto_close_locked(session_id, now)
        };
        self.release_employee_lock(key, lock);
        Ok(closed)
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        if self.fail_alerts {
            return Err(StoreError::Database("alerts table unavailable".to_string()));
        }
        self.state().alerts.push(alert.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
