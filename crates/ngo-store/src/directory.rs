use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use ngo_core::{InventoryError, InventoryResult, SchoolDirectory, StudentDirectory};

/// Fixed school and student registry, for tests and the memory backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    schools: HashMap<String, String>,
    students: HashSet<String>,
    school_lookup_fails: bool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_school(mut self, school_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.schools.insert(school_id.into(), name.into());
        self
    }

    pub fn with_student(mut self, student_id: impl Into<String>) -> Self {
        self.students.insert(student_id.into());
        self
    }

    /// Makes every school-name lookup return a storage error.
    pub fn failing_school_lookup(mut self) -> Self {
        self.school_lookup_fails = true;
        self
    }
}

#[async_trait]
impl SchoolDirectory for InMemoryDirectory {
    async fn school_name(&self, school_id: &str) -> InventoryResult<Option<String>> {
        if self.school_lookup_fails {
            return Err(InventoryError::Storage(
                "school directory unavailable".to_string(),
            ));
        }
        Ok(self.schools.get(school_id).cloned())
    }
}

#[async_trait]
impl StudentDirectory for InMemoryDirectory {
    async fn student_exists(&self, student_id: &str) -> InventoryResult<bool> {
        Ok(self.students.contains(student_id))
    }
}
