use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::catalog::{InMemoryCatalog, Program, ProgramCatalog, ProgramFilter};
use crate::error::StoreError;
use crate::grades::ANY_SYMBOL;

/// Read-only catalog backed by a CSV export, loaded once at startup.
#[derive(Debug, Clone)]
pub struct CsvCatalog {
    inner: InMemoryCatalog,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<i64>,
    name: String,
    level: String,
    #[serde(alias = "discipline_path")]
    path: String,
    #[serde(default, alias = "minimum_mean_grade")]
    min_mean_grade: Option<String>,
    #[serde(default, alias = "minimum_cluster_points")]
    min_cluster_points: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    subject_requirements: Option<String>,
    #[serde(default)]
    career_path_info: Option<String>,
}

impl From<CsvRow> for Program {
    fn from(row: CsvRow) -> Self {
        Program {
            id: row.id.unwrap_or(0),
            name: row.name,
            level: row.level,
            discipline_path: row.path,
            minimum_mean_grade: row
                .min_mean_grade
                .unwrap_or_else(|| ANY_SYMBOL.to_string()),
            minimum_cluster_points: row.min_cluster_points.unwrap_or(0.0),
            description: row.description.unwrap_or_default(),
            subject_requirements: row.subject_requirements,
            career_path_info: row.career_path_info,
        }
    }
}

impl CsvCatalog {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        info!(
            "loaded {} programs from {}",
            catalog.inner.programs().len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut programs = Vec::new();
        for row in csv_reader.deserialize::<CsvRow>() {
            programs.push(Program::from(row?));
        }
        Ok(Self {
            inner: InMemoryCatalog::new(programs),
        })
    }

    pub fn programs(&self) -> &[Program] {
        self.inner.programs()
    }
}

#[async_trait]
impl ProgramCatalog for CsvCatalog {
    async fn list_programs(&self, filter: &ProgramFilter) -> Result<Vec<Program>, StoreError> {
        self.inner.list_programs(filter).await
    }

    async fn discipline_paths(&self) -> Result<Vec<String>, StoreError> {
        self.inner.discipline_paths().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_blank_optional_columns() {
        let data = "\
id,name,level,path,min_mean_grade,min_cluster_points,description,subject_requirements,career_path_info
1,Bachelor of Medicine,Degree,Medicine,B+,42.5,Doctors,C+ in Biology,
2,Certificate in Plumbing,Artisan,Engineering,,,,,
";
        let catalog = CsvCatalog::from_reader(data.as_bytes()).unwrap();
        let programs = catalog.programs();
        assert_eq!(programs.len(), 2);
        assert_eq!(programs[0].minimum_mean_grade, "B+");
        assert_eq!(programs[0].minimum_cluster_points, 42.5);
        assert_eq!(programs[0].subject_requirements.as_deref(), Some("C+ in Biology"));
        assert_eq!(programs[1].minimum_mean_grade, "Any");
        assert_eq!(programs[1].minimum_cluster_points, 0.0);
        assert_eq!(programs[1].id, 2);
    }

    #[test]
    fn rejects_malformed_points() {
        let data = "name,level,path,min_cluster_points\nX,Degree,Law,lots\n";
        assert!(CsvCatalog::from_reader(data.as_bytes()).is_err());
    }
}
