use async_trait::async_trait;

use crate::catalog::{distinct_paths, Program, ProgramCatalog, ProgramFilter};
use crate::error::StoreError;

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    programs: Vec<Program>,
}

impl InMemoryCatalog {
    pub fn new(programs: Vec<Program>) -> Self {
        let programs = programs
            .into_iter()
            .enumerate()
            .map(|(idx, p)| {
                if p.id == 0 {
                    p.with_id(idx as i64 + 1)
                } else {
                    p
                }
            })
            .collect();
        Self { programs }
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }
}

#[async_trait]
impl ProgramCatalog for InMemoryCatalog {
    async fn list_programs(&self, filter: &ProgramFilter) -> Result<Vec<Program>, StoreError> {
        Ok(self
            .programs
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn discipline_paths(&self) -> Result<Vec<String>, StoreError> {
        Ok(distinct_paths(self.programs.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_ids_and_lists_paths() {
        let catalog = InMemoryCatalog::new(vec![
            Program::new("LLB", "Degree", "Law"),
            Program::new("BSc Nursing", "Degree", "Medicine").with_id(42),
            Program::new("Diploma in Law", "Diploma", "Law"),
        ]);
        let ids = catalog.programs().iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 42, 3]);

        let paths = tokio_test::block_on(catalog.discipline_paths()).unwrap();
        assert_eq!(paths, vec!["Law".to_string(), "Medicine".to_string()]);

        let law = tokio_test::block_on(catalog.list_programs(&ProgramFilter {
            discipline_path: Some("law".to_string()),
            ..ProgramFilter::default()
        }))
        .unwrap();
        assert_eq!(law.len(), 2);
    }
}
