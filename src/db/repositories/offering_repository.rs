use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::Offering;
use crate::db::DatabaseError;

use super::OfferingCatalog;

/// Postgres view onto the offering catalog. The catalog is owned elsewhere;
/// the scheduler only ever reads single records from it.
pub struct PgOfferingCatalog {
    pool: PgPool,
}

impl PgOfferingCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfferingCatalog for PgOfferingCatalog {
    async fn get(&self, id: Uuid) -> Result<Option<Offering>, DatabaseError> {
        let row = sqlx::query_as::<_, Offering>("SELECT * FROM offerings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
