//! In-memory store implementations backing the test suite and local runs
//! without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{Appointment, BookingFilter, Offering, Setting};
use crate::db::DatabaseError;
use crate::scheduling::{day_end, day_start};

use super::{AppointmentStore, OfferingCatalog, SettingsStore};

#[derive(Default)]
pub struct MemoryAppointmentStore {
    rows: RwLock<HashMap<Uuid, Appointment>>,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn insert(&self, appointment: &Appointment) -> Result<(), DatabaseError> {
        self.rows
            .write()
            .await
            .insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> Result<(), DatabaseError> {
        self.rows
            .write()
            .await
            .insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.rows.write().await.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Appointment>, DatabaseError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|a| a.verification_token == token)
            .cloned())
    }

    async fn find_active_by_pin(&self, pin: &str) -> Result<Option<Appointment>, DatabaseError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|a| a.status.is_active() && a.verification_pin == pin)
            .cloned())
    }

    async fn find_active_between(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let mut rows: Vec<Appointment> = self
            .rows
            .read()
            .await
            .values()
            .filter(|a| a.status.is_active())
            .filter(|a| a.scheduled_at >= from && a.scheduled_at < to)
            .filter(|a| Some(a.id) != exclude)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.scheduled_at);
        Ok(rows)
    }

    async fn find_completed_between(
        &self,
        from: Option<OffsetDateTime>,
        to: Option<OffsetDateTime>,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let mut rows: Vec<Appointment> = self
            .rows
            .read()
            .await
            .values()
            .filter(|a| a.status == crate::db::models::AppointmentStatus::Completed)
            .filter(|a| from.map_or(true, |from| a.scheduled_at >= from))
            .filter(|a| to.map_or(true, |to| a.scheduled_at < to))
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.scheduled_at);
        Ok(rows)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Appointment>, DatabaseError> {
        let mut rows: Vec<Appointment> = self
            .rows
            .read()
            .await
            .values()
            .filter(|a| a.archived == filter.archived)
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .filter(|a| filter.from.map_or(true, |d| a.scheduled_at >= day_start(d)))
            .filter(|a| filter.to.map_or(true, |d| a.scheduled_at < day_end(d)))
            .cloned()
            .collect();
        if filter.archived {
            rows.sort_by_key(|a| std::cmp::Reverse(a.archived_at));
        } else {
            rows.sort_by_key(|a| a.scheduled_at);
        }
        Ok(rows)
    }
}

#[derive(Default)]
pub struct MemoryOfferingCatalog {
    rows: RwLock<HashMap<Uuid, Offering>>,
}

impl MemoryOfferingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, offering: Offering) {
        self.rows.write().await.insert(offering.id, offering);
    }

    pub async fn remove(&self, id: Uuid) {
        self.rows.write().await.remove(&id);
    }
}

#[async_trait]
impl OfferingCatalog for MemoryOfferingCatalog {
    async fn get(&self, id: Uuid) -> Result<Option<Offering>, DatabaseError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    rows: RwLock<HashMap<String, Setting>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Setting>, DatabaseError> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn upsert(
        &self,
        key: &str,
        value: serde_json::Value,
        description: Option<&str>,
    ) -> Result<Setting, DatabaseError> {
        let row = Setting {
            key: key.to_string(),
            value,
            description: description.map(str::to_string),
            updated_at: OffsetDateTime::now_utc(),
        };
        self.rows.write().await.insert(key.to_string(), row.clone());
        Ok(row)
    }

    async fn all(&self) -> Result<Vec<Setting>, DatabaseError> {
        let mut rows: Vec<Setting> = self.rows.read().await.values().cloned().collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }
}
