use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::models::{Appointment, BookingFilter};
use crate::db::DatabaseError;
use crate::scheduling::{day_end, day_start};

use super::AppointmentStore;

/// Postgres-backed appointment store. Queries go through sqlx's runtime API
/// so the crate builds without a live database.
pub struct PgAppointmentStore {
    pool: PgPool,
}

impl PgAppointmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn insert(&self, appointment: &Appointment) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO appointments (
                id, client_name, client_email, client_phone, scheduled_at,
                offering_id, duration_minutes, status, archived, archived_at,
                verification_token, verification_pin, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(appointment.id)
        .bind(&appointment.client_name)
        .bind(&appointment.client_email)
        .bind(&appointment.client_phone)
        .bind(appointment.scheduled_at)
        .bind(appointment.offering_id)
        .bind(appointment.duration_minutes)
        .bind(appointment.status)
        .bind(appointment.archived)
        .bind(appointment.archived_at)
        .bind(&appointment.verification_token)
        .bind(&appointment.verification_pin)
        .bind(&appointment.notes)
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> Result<(), DatabaseError> {
        // Token, PIN and created_at are immutable after creation.
        sqlx::query(
            r#"
            UPDATE appointments
            SET client_name = $2,
                client_email = $3,
                client_phone = $4,
                scheduled_at = $5,
                offering_id = $6,
                duration_minutes = $7,
                status = $8,
                archived = $9,
                archived_at = $10,
                notes = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(appointment.id)
        .bind(&appointment.client_name)
        .bind(&appointment.client_email)
        .bind(&appointment.client_phone)
        .bind(appointment.scheduled_at)
        .bind(appointment.offering_id)
        .bind(appointment.duration_minutes)
        .bind(appointment.status)
        .bind(appointment.archived)
        .bind(appointment.archived_at)
        .bind(&appointment.notes)
        .bind(appointment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        let row = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Appointment>, DatabaseError> {
        let row = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE verification_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_active_by_pin(&self, pin: &str) -> Result<Option<Appointment>, DatabaseError> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE verification_pin = $1 AND status IN ('pending', 'confirmed')
            "#,
        )
        .bind(pin)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_active_between(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT * FROM appointments WHERE status IN ('pending', 'confirmed') AND scheduled_at >= ",
        );
        query.push_bind(from);
        query.push(" AND scheduled_at < ");
        query.push_bind(to);
        if let Some(id) = exclude {
            query.push(" AND id <> ");
            query.push_bind(id);
        }
        query.push(" ORDER BY scheduled_at");

        let rows = query
            .build_query_as::<Appointment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_completed_between(
        &self,
        from: Option<OffsetDateTime>,
        to: Option<OffsetDateTime>,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM appointments WHERE status = 'completed'");
        if let Some(from) = from {
            query.push(" AND scheduled_at >= ");
            query.push_bind(from);
        }
        if let Some(to) = to {
            query.push(" AND scheduled_at < ");
            query.push_bind(to);
        }
        query.push(" ORDER BY scheduled_at");

        let rows = query
            .build_query_as::<Appointment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Appointment>, DatabaseError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM appointments WHERE archived = ");
        query.push_bind(filter.archived);
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status);
        }
        if let Some(from) = filter.from {
            query.push(" AND scheduled_at >= ");
            query.push_bind(day_start(from));
        }
        if let Some(to) = filter.to {
            query.push(" AND scheduled_at < ");
            query.push_bind(day_end(to));
        }
        if filter.archived {
            query.push(" ORDER BY archived_at DESC");
        } else {
            query.push(" ORDER BY scheduled_at");
        }

        let rows = query
            .build_query_as::<Appointment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
