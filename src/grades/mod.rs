pub mod entry;
pub mod scale;
pub mod subjects;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cluster::ClusterScoreSet;

pub use entry::{apply_grade_entry, GradeEntry, GradeEntryError, SubjectGradeInput};
pub use scale::{Grade, GradeScale, GradeScaleError, ANY_RANK, ANY_SYMBOL, LOWEST_RANK, TOP_RANK};
pub use subjects::{Subject, SubjectGradeSet, SubjectGroup, SubjectParseError};

/// Everything stored for one student. `mean_grade` keeps the raw stored text
/// so that read paths can tolerate values written by older tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentRecord {
    pub student_id: String,
    pub mean_grade: Option<String>,
    pub subjects: SubjectGradeSet,
    pub clusters: ClusterScoreSet,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            mean_grade: None,
            subjects: SubjectGradeSet::default(),
            clusters: ClusterScoreSet::default(),
            updated_at: Utc::now(),
        }
    }

    /// The stored mean grade, if one is present and non-blank.
    pub fn mean_grade_symbol(&self) -> Option<&str> {
        self.mean_grade
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Rank of the stored mean grade; off-scale values count as the lowest rank.
    pub fn mean_rank(&self) -> Option<u8> {
        self.mean_grade_symbol().map(GradeScale::rank_or_lowest)
    }
}
