use async_trait::async_trait;

use crate::error::InventoryResult;

/// School registry lookups owned by the school service.
#[async_trait]
pub trait SchoolDirectory: Send + Sync {
    async fn school_name(&self, school_id: &str) -> InventoryResult<Option<String>>;
}

/// Student registry lookups owned by the student service.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    async fn student_exists(&self, student_id: &str) -> InventoryResult<bool>;
}

/// Bearer-token check for admin calls.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> bool;
}
