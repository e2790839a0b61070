use async_trait::async_trait;
use ngo_core::{InventoryError, InventoryResult, SchoolDirectory, StudentDirectory};
use sqlx::PgPool;

/// Reads the `schools` and `students` tables maintained by the registry
/// services that share this database.
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchoolDirectory for PgDirectory {
    async fn school_name(&self, school_id: &str) -> InventoryResult<Option<String>> {
        sqlx::query_scalar("SELECT name FROM schools WHERE id = $1")
            .bind(school_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| InventoryError::Storage(err.to_string()))
    }
}

#[async_trait]
impl StudentDirectory for PgDirectory {
    async fn student_exists(&self, student_id: &str) -> InventoryResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM students WHERE id = $1)")
            .bind(student_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| InventoryError::Storage(err.to_string()))
    }
}
