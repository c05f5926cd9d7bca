pub mod migrations;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::grades::StudentRecord;

pub use sqlite::SqliteStore;

/// One grade record per student, replaced whole on every save.
#[async_trait]
pub trait GradeStore: Send + Sync {
    async fn load_record(&self, student_id: &str) -> Result<Option<StudentRecord>, StoreError>;
    async fn save_record(&self, record: &StudentRecord) -> Result<(), StoreError>;
}

/// Whether a student may see full results. How a student becomes unlocked
/// is decided elsewhere.
#[async_trait]
pub trait EntitlementGate: Send + Sync {
    async fn is_unlocked(&self, student_id: &str) -> Result<bool, StoreError>;
}

/// Gate that lets everyone through, for deployments without paid results.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

#[async_trait]
impl EntitlementGate for OpenGate {
    async fn is_unlocked(&self, _student_id: &str) -> Result<bool, StoreError> {
        Ok(true)
    }
}
