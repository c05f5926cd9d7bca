pub mod file;
pub mod memory;

use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::grades::ANY_SYMBOL;

pub use file::CsvCatalog;
pub use memory::InMemoryCatalog;

/// A catalogued study program. Read-only as far as the engine is concerned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Program {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub level: String,
    #[serde(alias = "path")]
    pub discipline_path: String,
    #[serde(default = "default_minimum_mean_grade", alias = "min_mean_grade")]
    pub minimum_mean_grade: String,
    #[serde(default, alias = "min_cluster_points")]
    pub minimum_cluster_points: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject_requirements: Option<String>,
    #[serde(default)]
    pub career_path_info: Option<String>,
}

impl Program {
    pub fn new(name: &str, level: &str, discipline_path: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            level: level.to_string(),
            discipline_path: discipline_path.to_string(),
            minimum_mean_grade: default_minimum_mean_grade(),
            minimum_cluster_points: 0.0,
            description: String::new(),
            subject_requirements: None,
            career_path_info: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_minimum_grade(mut self, grade: &str) -> Self {
        self.minimum_mean_grade = grade.to_string();
        self
    }

    pub fn with_cluster_points(mut self, points: f64) -> Self {
        self.minimum_cluster_points = points;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

fn default_minimum_mean_grade() -> String {
    ANY_SYMBOL.to_string()
}

/// Result tiers, matched against the free-text `level` field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProgramLevel {
    Degree,
    Diploma,
    Certificate,
    Artisan,
}

impl ProgramLevel {
    pub const ALL: [ProgramLevel; 4] = [
        ProgramLevel::Degree,
        ProgramLevel::Diploma,
        ProgramLevel::Certificate,
        ProgramLevel::Artisan,
    ];

    fn keyword(&self) -> &'static str {
        match self {
            Self::Degree => "degree",
            Self::Diploma => "diploma",
            Self::Certificate => "certificate",
            Self::Artisan => "artisan",
        }
    }

    pub fn matches(&self, level: &str) -> bool {
        level.to_lowercase().contains(self.keyword())
    }
}

impl Display for ProgramLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Degree => "Degree",
            Self::Diploma => "Diploma",
            Self::Certificate => "Certificate",
            Self::Artisan => "Artisan",
        };
        write!(f, "{display}")
    }
}

/// Narrowing applied by the catalog before any grade logic runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgramFilter {
    /// Case-insensitive exact match on `discipline_path`; `All` disables it.
    pub discipline_path: Option<String>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    /// Exact (trimmed) match on `minimum_mean_grade`.
    pub minimum_mean_grade: Option<String>,
}

impl ProgramFilter {
    pub fn exact_grade(symbol: &str) -> Self {
        Self {
            minimum_mean_grade: Some(symbol.to_string()),
            ..Self::default()
        }
    }

    pub fn active_path(&self) -> Option<&str> {
        self.discipline_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("all"))
    }

    pub fn active_search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, program: &Program) -> bool {
        if let Some(path) = self.active_path() {
            if !program.discipline_path.trim().eq_ignore_ascii_case(path) {
                return false;
            }
        }
        if let Some(search) = self.active_search() {
            let needle = search.to_lowercase();
            if !program.name.to_lowercase().contains(&needle)
                && !program.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(grade) = &self.minimum_mean_grade {
            if program.minimum_mean_grade.trim() != grade.trim() {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait ProgramCatalog: Send + Sync {
    async fn list_programs(&self, filter: &ProgramFilter) -> Result<Vec<Program>, StoreError>;
    async fn discipline_paths(&self) -> Result<Vec<String>, StoreError>;
}

/// Distinct, sorted discipline paths for filter menus.
pub fn distinct_paths<'a>(programs: impl Iterator<Item = &'a Program>) -> Vec<String> {
    let mut paths = programs
        .map(|p| p.discipline_path.clone())
        .collect::<Vec<_>>();
    paths.sort();
    paths.dedup();
    paths
}
