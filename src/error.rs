use thiserror::Error;

use crate::grades::GradeEntryError;

/// Failures from a storage or catalog adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("no mean grade on file for student {0}; enter grades first")]
    MissingMeanGrade(String),
    #[error("student {0} has not unlocked full results")]
    EntitlementRequired(String),
    #[error("program catalog unavailable: {0}")]
    CatalogUnavailable(#[source] StoreError),
    #[error("grade store error: {0}")]
    Store(#[source] StoreError),
}

impl RecommendError {
    /// What the caller should send the student to next, if anything.
    pub fn action(&self) -> Option<&'static str> {
        match self {
            Self::MissingMeanGrade(_) => Some("enter_grades"),
            Self::EntitlementRequired(_) => Some("unlock"),
            Self::CatalogUnavailable(_) | Self::Store(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveGradesError {
    #[error(transparent)]
    Invalid(#[from] GradeEntryError),
    #[error("grade store error: {0}")]
    Store(#[from] StoreError),
}
