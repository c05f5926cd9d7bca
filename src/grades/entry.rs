use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cluster::calculator::calculate_clusters;
use crate::grades::scale::{Grade, GradeScaleError};
use crate::grades::subjects::{Subject, SubjectGradeSet};
use crate::grades::StudentRecord;

/// A subject grade as typed by the student: either a letter or raw points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SubjectGradeInput {
    Points(i64),
    Symbol(String),
}

impl SubjectGradeInput {
    fn resolve(&self, subject: Subject) -> Result<Grade, GradeEntryError> {
        match self {
            Self::Points(points) => u8::try_from(*points)
                .ok()
                .and_then(Grade::from_rank)
                .ok_or(GradeEntryError::PointsOutOfRange {
                    subject,
                    points: *points,
                }),
            Self::Symbol(raw) => {
                if let Ok(points) = raw.trim().parse::<i64>() {
                    return Self::Points(points).resolve(subject);
                }
                raw.parse::<Grade>()
                    .map_err(|source| GradeEntryError::Subject { subject, source })
            }
        }
    }
}

/// Raw form submission for the grade-entry step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GradeEntry {
    pub mean_grade: Option<String>,
    #[serde(default)]
    pub subjects: BTreeMap<String, SubjectGradeInput>,
}

#[derive(Debug, Error)]
pub enum GradeEntryError {
    #[error("mean grade is required")]
    MissingMeanGrade,
    #[error("invalid mean grade: {0}")]
    MeanGrade(#[source] GradeScaleError),
    #[error("invalid grade for {subject}: {source}")]
    Subject {
        subject: Subject,
        #[source]
        source: GradeScaleError,
    },
    #[error("{subject} points must be between 1 and 12, got {points}")]
    PointsOutOfRange { subject: Subject, points: i64 },
    #[error("unknown subject: {0}")]
    UnknownSubject(String),
}

impl GradeEntry {
    /// Checks every field and returns the parsed mean grade and subjects.
    /// Nothing is returned unless the whole submission is valid.
    pub fn validate(&self) -> Result<(Grade, SubjectGradeSet), GradeEntryError> {
        let raw_mean = self
            .mean_grade
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(GradeEntryError::MissingMeanGrade)?;
        let mean = raw_mean.parse::<Grade>().map_err(GradeEntryError::MeanGrade)?;

        let mut subjects = SubjectGradeSet::new();
        for (name, input) in &self.subjects {
            let subject = name
                .parse::<Subject>()
                .map_err(|_| GradeEntryError::UnknownSubject(name.clone()))?;
            subjects.set_grade(subject, input.resolve(subject)?);
        }
        Ok((mean, subjects))
    }
}

/// Validates `entry` and produces the replacement record for `student_id`,
/// with all four cluster scores recomputed from the new subject grades.
pub fn apply_grade_entry(
    student_id: &str,
    entry: &GradeEntry,
) -> Result<StudentRecord, GradeEntryError> {
    let (mean, subjects) = entry.validate()?;
    let clusters = calculate_clusters(&subjects);
    Ok(StudentRecord {
        student_id: student_id.to_string(),
        mean_grade: Some(mean.symbol().to_string()),
        subjects,
        clusters,
        updated_at: Utc::now(),
    })
}
