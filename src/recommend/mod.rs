pub mod pagination;
pub mod pipeline;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{CsvCatalog, ProgramCatalog, ProgramFilter, ProgramLevel};
use crate::cluster::ClusterScoreSet;
use crate::config::{Config, ResultsConfig};
use crate::error::{RecommendError, SaveGradesError, StoreError};
use crate::grades::{apply_grade_entry, GradeEntry, StudentRecord};
use crate::matching::{analyze_near_misses, near_miss_target, top_picks, QualifiedProgram};
use crate::store::{EntitlementGate, GradeStore, SqliteStore};

pub use pagination::{paginate, Page};
pub use pipeline::{rank_qualified, split_tiers};

pub type TierPage = Page<QualifiedProgram>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecommendationQuery {
    pub student_id: String,
    #[serde(default)]
    pub discipline: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

impl RecommendationQuery {
    pub fn for_student(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            ..Self::default()
        }
    }

    fn catalog_filter(&self) -> ProgramFilter {
        ProgramFilter {
            discipline_path: self.discipline.clone(),
            search: self.search.clone(),
            minimum_mean_grade: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TieredPrograms {
    pub degree: TierPage,
    pub diploma: TierPage,
    pub certificate: TierPage,
    pub artisan: TierPage,
}

impl TieredPrograms {
    pub fn tiers(&self) -> [(ProgramLevel, &TierPage); 4] {
        [
            (ProgramLevel::Degree, &self.degree),
            (ProgramLevel::Diploma, &self.diploma),
            (ProgramLevel::Certificate, &self.certificate),
            (ProgramLevel::Artisan, &self.artisan),
        ]
    }

    pub fn total_items(&self) -> usize {
        self.tiers().iter().map(|(_, page)| page.total_items).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub student_id: String,
    pub mean_grade: String,
    pub clusters: ClusterScoreSet,
    pub filter: ProgramFilter,
    pub available_paths: Vec<String>,
    pub qualified_programs_by_tier: TieredPrograms,
    pub top_picks: Vec<QualifiedProgram>,
    pub near_misses: Vec<QualifiedProgram>,
}

/// Runs the recommendation pipeline against the catalog, grade store and
/// entitlement collaborators.
#[derive(Clone)]
pub struct RecommendationService {
    catalog: Arc<dyn ProgramCatalog>,
    grades: Arc<dyn GradeStore>,
    gate: Arc<dyn EntitlementGate>,
    settings: ResultsConfig,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<dyn ProgramCatalog>,
        grades: Arc<dyn GradeStore>,
        gate: Arc<dyn EntitlementGate>,
        settings: ResultsConfig,
    ) -> Self {
        Self {
            catalog,
            grades,
            gate,
            settings,
        }
    }

    /// Wires the SQLite store in as grade store and gate. Programs come from
    /// the configured CSV export when one is set, otherwise from the store.
    pub fn from_config(config: &Config, store: Arc<SqliteStore>) -> Result<Self, StoreError> {
        let catalog: Arc<dyn ProgramCatalog> = match config.resolved_catalog_csv() {
            Some(path) => Arc::new(CsvCatalog::open(&path)?),
            None => store.clone(),
        };
        Ok(Self::new(
            catalog,
            store.clone(),
            store,
            config.results.clone(),
        ))
    }

    pub fn settings(&self) -> &ResultsConfig {
        &self.settings
    }

    pub fn catalog(&self) -> &Arc<dyn ProgramCatalog> {
        &self.catalog
    }

    /// Validates and stores a grade submission, recomputing cluster points.
    pub async fn save_grades(
        &self,
        student_id: &str,
        entry: &GradeEntry,
    ) -> Result<StudentRecord, SaveGradesError> {
        let record = apply_grade_entry(student_id, entry)?;
        self.grades.save_record(&record).await?;
        info!(
            "saved grades for {student_id}: mean {} medicine {:.0} engineering {:.0} law {:.0} arts {:.0}",
            record.mean_grade.as_deref().unwrap_or("-"),
            record.clusters.medicine,
            record.clusters.engineering,
            record.clusters.law,
            record.clusters.arts
        );
        Ok(record)
    }

    pub async fn student(&self, student_id: &str) -> Result<Option<StudentRecord>, RecommendError> {
        self.grades
            .load_record(student_id)
            .await
            .map_err(RecommendError::Store)
    }

    pub async fn recommend(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Recommendation, RecommendError> {
        let (record, student_rank) = self.graded_student(&query.student_id).await?;
        let filter = query.catalog_filter();

        let candidates = self
            .catalog
            .list_programs(&filter)
            .await
            .map_err(RecommendError::CatalogUnavailable)?;
        debug!("{} catalog candidates for {}", candidates.len(), query.student_id);

        let ranked = rank_qualified(candidates, student_rank, &record.clusters);
        let qualified_programs_by_tier = split_tiers(&ranked, query.page, &self.settings);
        let picks = top_picks(&ranked, self.settings.top_picks);
        let near_misses = self.near_misses_for(&record, student_rank).await?;
        let available_paths = self
            .catalog
            .discipline_paths()
            .await
            .map_err(RecommendError::CatalogUnavailable)?;

        info!(
            "recommendation for {}: {} qualified, {} near misses",
            query.student_id,
            ranked.len(),
            near_misses.len()
        );

        Ok(Recommendation {
            student_id: record.student_id.clone(),
            mean_grade: record.mean_grade_symbol().unwrap_or_default().to_string(),
            clusters: record.clusters,
            filter,
            available_paths,
            qualified_programs_by_tier,
            top_picks: picks,
            near_misses,
        })
    }

    pub async fn near_misses(&self, student_id: &str) -> Result<Vec<QualifiedProgram>, RecommendError> {
        let (record, student_rank) = self.graded_student(student_id).await?;
        self.near_misses_for(&record, student_rank).await
    }

    /// Entitlement first, then the mean-grade precondition.
    async fn graded_student(&self, student_id: &str) -> Result<(StudentRecord, u8), RecommendError> {
        if self.settings.require_unlock {
            let unlocked = self
                .gate
                .is_unlocked(student_id)
                .await
                .map_err(RecommendError::Store)?;
            if !unlocked {
                return Err(RecommendError::EntitlementRequired(student_id.to_string()));
            }
        }
        let record = self
            .student(student_id)
            .await?
            .ok_or_else(|| RecommendError::MissingMeanGrade(student_id.to_string()))?;
        let rank = record
            .mean_rank()
            .ok_or_else(|| RecommendError::MissingMeanGrade(student_id.to_string()))?;
        Ok((record, rank))
    }

    async fn near_misses_for(
        &self,
        record: &StudentRecord,
        student_rank: u8,
    ) -> Result<Vec<QualifiedProgram>, RecommendError> {
        let Some(target) = near_miss_target(student_rank) else {
            return Ok(Vec::new());
        };
        let candidates = self
            .catalog
            .list_programs(&ProgramFilter::exact_grade(target))
            .await
            .map_err(RecommendError::CatalogUnavailable)?;
        Ok(analyze_near_misses(
            candidates,
            student_rank,
            &record.clusters,
            self.settings.near_miss_limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::catalog::{InMemoryCatalog, Program};
    use crate::error::StoreError;
    use crate::grades::SubjectGradeInput;
    use crate::matching::ChanceLabel;
    use crate::store::{OpenGate, SqliteStore};

    struct BrokenCatalog;

    #[async_trait]
    impl ProgramCatalog for BrokenCatalog {
        async fn list_programs(&self, _filter: &ProgramFilter) -> Result<Vec<Program>, StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "catalog offline",
            )))
        }

        async fn discipline_paths(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn catalog() -> Arc<InMemoryCatalog> {
        Arc::new(InMemoryCatalog::new(vec![
            Program::new("Diploma in Plumbing", "Certificate", "Engineering")
                .with_minimum_grade("D"),
            Program::new("BSc Nursing", "Degree", "Medicine")
                .with_minimum_grade("C+")
                .with_cluster_points(25.0),
            Program::new("LLB", "Degree", "Law").with_minimum_grade("B-"),
            Program::new("BEd Arts", "Degree", "Education").with_minimum_grade("C+"),
        ]))
    }

    fn entry(mean: &str) -> GradeEntry {
        let mut entry = GradeEntry {
            mean_grade: Some(mean.to_string()),
            ..GradeEntry::default()
        };
        for (subject, points) in [
            ("biology", 9),
            ("chemistry", 7),
            ("mathematics", 6),
            ("english", 8),
            ("kiswahili", 6),
        ] {
            entry
                .subjects
                .insert(subject.to_string(), SubjectGradeInput::Points(points));
        }
        entry
    }

    fn service(store: Arc<SqliteStore>, catalog: Arc<dyn ProgramCatalog>) -> RecommendationService {
        RecommendationService::new(catalog, store.clone(), store, ResultsConfig::default())
    }

    #[tokio::test]
    async fn locked_student_is_stopped_before_grade_check() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let service = service(store, catalog());
        let err = service
            .recommend(&RecommendationQuery::for_student("s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::EntitlementRequired(_)));
        assert_eq!(err.action(), Some("unlock"));
    }

    #[tokio::test]
    async fn missing_grades_require_grade_entry() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.set_unlocked("s1", true).unwrap();
        let service = service(store, catalog());
        let err = service
            .recommend(&RecommendationQuery::for_student("s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::MissingMeanGrade(_)));
        assert_eq!(err.action(), Some("enter_grades"));
    }

    #[tokio::test]
    async fn full_pipeline_for_c_plus_student() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.set_unlocked("s1", true).unwrap();
        let service = service(store, catalog());
        let record = service.save_grades("s1", &entry("C+")).await.unwrap();
        assert_eq!(record.clusters.medicine, 30.0);

        let result = service
            .recommend(&RecommendationQuery::for_student("s1"))
            .await
            .unwrap();
        assert_eq!(result.mean_grade, "C+");
        assert_eq!(result.qualified_programs_by_tier.degree.total_items, 2);
        assert_eq!(result.qualified_programs_by_tier.certificate.total_items, 1);
        let nursing = &result.qualified_programs_by_tier.degree.items[0];
        assert_eq!(nursing.program.name, "BSc Nursing");
        assert_eq!(nursing.gap, 5.0);
        assert_eq!(nursing.chance_label, ChanceLabel::HighlyLikely);

        assert_eq!(result.top_picks.len(), 3);
        assert_eq!(result.top_picks[0].program.name, "BSc Nursing");

        assert_eq!(result.near_misses.len(), 1);
        assert_eq!(result.near_misses[0].program.name, "LLB");
        assert_eq!(result.near_misses[0].chance_label, ChanceLabel::MissedByOneGrade);
        assert_eq!(
            result.available_paths,
            vec!["Education", "Engineering", "Law", "Medicine"]
        );
    }

    #[tokio::test]
    async fn discipline_filter_and_search_narrow_results() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let catalog = catalog();
        let service = RecommendationService::new(
            catalog,
            store.clone(),
            Arc::new(OpenGate),
            ResultsConfig::default(),
        );
        service.save_grades("s1", &entry("A")).await.unwrap();

        let query = RecommendationQuery {
            discipline: Some("law".to_string()),
            ..RecommendationQuery::for_student("s1")
        };
        let result = service.recommend(&query).await.unwrap();
        assert_eq!(result.qualified_programs_by_tier.total_items(), 1);
        assert!(result.near_misses.is_empty());

        let query = RecommendationQuery {
            search: Some("nursing".to_string()),
            ..RecommendationQuery::for_student("s1")
        };
        let result = service.recommend(&query).await.unwrap();
        assert_eq!(result.qualified_programs_by_tier.degree.items[0].program.name, "BSc Nursing");
        assert_eq!(result.qualified_programs_by_tier.total_items(), 1);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let service = RecommendationService::new(
            Arc::new(InMemoryCatalog::default()),
            store.clone(),
            Arc::new(OpenGate),
            ResultsConfig::default(),
        );
        service.save_grades("s1", &entry("E")).await.unwrap();
        let result = service
            .recommend(&RecommendationQuery::for_student("s1"))
            .await
            .unwrap();
        assert_eq!(result.qualified_programs_by_tier.total_items(), 0);
        assert!(result.top_picks.is_empty());
        assert_eq!(result.qualified_programs_by_tier.degree.total_pages, 1);
    }

    #[tokio::test]
    async fn catalog_failure_is_reported() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let service = RecommendationService::new(
            Arc::new(BrokenCatalog),
            store.clone(),
            Arc::new(OpenGate),
            ResultsConfig::default(),
        );
        service.save_grades("s1", &entry("B")).await.unwrap();
        let err = service
            .recommend(&RecommendationQuery::for_student("s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::CatalogUnavailable(_)));
    }

    #[tokio::test]
    async fn rejected_entry_leaves_previous_record() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let service = service(store.clone(), catalog());
        service.save_grades("s1", &entry("B")).await.unwrap();
        let err = service.save_grades("s1", &entry("Z")).await.unwrap_err();
        assert!(matches!(err, SaveGradesError::Invalid(_)));
        let stored = store.load_student("s1").unwrap().unwrap();
        assert_eq!(stored.mean_grade.as_deref(), Some("B"));
    }
}
