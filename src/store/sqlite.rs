use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::catalog::{Program, ProgramCatalog, ProgramFilter};
use crate::cluster::ClusterScoreSet;
use crate::error::StoreError;
use crate::grades::{StudentRecord, SubjectGradeSet};
use crate::store::migrations::BASE_MIGRATION;
use crate::store::{EntitlementGate, GradeStore};

const PROGRAM_COLUMNS: &str = "id, name, level, path, min_mean_grade, min_cluster_points, \
     description, subject_requirements, career_path_info";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn migrate(&self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    /// Adds a program and returns its new id.
    pub fn insert_program(&self, program: &Program) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
INSERT INTO programs(
    name, level, path, min_mean_grade, min_cluster_points,
    description, subject_requirements, career_path_info
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#,
            params![
                program.name,
                program.level,
                program.discipline_path,
                program.minimum_mean_grade,
                program.minimum_cluster_points,
                program.description,
                program.subject_requirements,
                program.career_path_info
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn query_programs(&self, filter: &ProgramFilter) -> Result<Vec<Program>, StoreError> {
        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(path) = filter.active_path() {
            values.push(path.to_string());
            clauses.push(format!("LOWER(TRIM(path)) = LOWER(?{})", values.len()));
        }
        if let Some(search) = filter.active_search() {
            values.push(format!("%{}%", escape_like(search)));
            let idx = values.len();
            clauses.push(format!(
                "(name LIKE ?{idx} ESCAPE '\\' OR description LIKE ?{idx} ESCAPE '\\')"
            ));
        }
        if let Some(grade) = &filter.minimum_mean_grade {
            values.push(grade.trim().to_string());
            clauses.push(format!("TRIM(min_mean_grade) = ?{}", values.len()));
        }

        let mut sql = format!("SELECT {PROGRAM_COLUMNS} FROM programs");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), row_to_program)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn distinct_paths(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT path FROM programs ORDER BY path")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn load_student(&self, student_id: &str) -> Result<Option<StudentRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
SELECT student_id, mean_grade, subjects_json,
       cluster_medicine, cluster_engineering, cluster_law, cluster_arts, updated_at
FROM student_grades
WHERE student_id = ?1
"#,
        )?;
        let raw = stmt
            .query_row(params![student_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                    ClusterScoreSet {
                        medicine: row.get(3)?,
                        engineering: row.get(4)?,
                        law: row.get(5)?,
                        arts: row.get(6)?,
                    },
                    row.get::<_, String>(7)?,
                ))
            })
            .optional()?;
        let Some((student_id, mean_grade, subjects_json, clusters, updated_at)) = raw else {
            return Ok(None);
        };
        let subjects: SubjectGradeSet = serde_json::from_str(&subjects_json)?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        Ok(Some(StudentRecord {
            student_id,
            mean_grade,
            subjects,
            clusters,
            updated_at,
        }))
    }

    /// Grades and all four cluster scores go out in one statement, so a
    /// reader never sees a half-updated record.
    pub fn upsert_student(&self, record: &StudentRecord) -> Result<(), StoreError> {
        let subjects_json = serde_json::to_string(&record.subjects)?;
        self.conn()?.execute(
            r#"
INSERT INTO student_grades(
    student_id, mean_grade, subjects_json,
    cluster_medicine, cluster_engineering, cluster_law, cluster_arts, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
ON CONFLICT(student_id) DO UPDATE SET
    mean_grade = excluded.mean_grade,
    subjects_json = excluded.subjects_json,
    cluster_medicine = excluded.cluster_medicine,
    cluster_engineering = excluded.cluster_engineering,
    cluster_law = excluded.cluster_law,
    cluster_arts = excluded.cluster_arts,
    updated_at = excluded.updated_at
"#,
            params![
                record.student_id,
                record.mean_grade,
                subjects_json,
                record.clusters.medicine,
                record.clusters.engineering,
                record.clusters.law,
                record.clusters.arts,
                record.updated_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn set_unlocked(&self, student_id: &str, unlocked: bool) -> Result<(), StoreError> {
        self.conn()?.execute(
            r#"
INSERT INTO entitlements(student_id, unlocked, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(student_id) DO UPDATE SET
    unlocked = excluded.unlocked,
    updated_at = excluded.updated_at
"#,
            params![
                student_id,
                if unlocked { 1 } else { 0 },
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn unlocked(&self, student_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let flag: Option<i64> = conn
            .query_row(
                "SELECT unlocked FROM entitlements WHERE student_id = ?1",
                params![student_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(flag.unwrap_or(0) != 0)
    }
}

#[async_trait]
impl ProgramCatalog for SqliteStore {
    async fn list_programs(&self, filter: &ProgramFilter) -> Result<Vec<Program>, StoreError> {
        self.query_programs(filter)
    }

    async fn discipline_paths(&self) -> Result<Vec<String>, StoreError> {
        self.distinct_paths()
    }
}

#[async_trait]
impl GradeStore for SqliteStore {
    async fn load_record(&self, student_id: &str) -> Result<Option<StudentRecord>, StoreError> {
        self.load_student(student_id)
    }

    async fn save_record(&self, record: &StudentRecord) -> Result<(), StoreError> {
        self.upsert_student(record)
    }
}

#[async_trait]
impl EntitlementGate for SqliteStore {
    async fn is_unlocked(&self, student_id: &str) -> Result<bool, StoreError> {
        self.unlocked(student_id)
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn row_to_program(row: &rusqlite::Row<'_>) -> rusqlite::Result<Program> {
    Ok(Program {
        id: row.get(0)?,
        name: row.get(1)?,
        level: row.get(2)?,
        discipline_path: row.get(3)?,
        minimum_mean_grade: row.get(4)?,
        minimum_cluster_points: row.get(5)?,
        description: row.get(6)?,
        subject_requirements: row.get(7)?,
        career_path_info: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::{Grade, Subject};

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().expect("open store");
        for program in [
            Program::new("BSc Nursing", "Degree", "Medicine")
                .with_minimum_grade("C+")
                .with_cluster_points(35.0)
                .with_description("Clinical care"),
            Program::new("Diploma in ICT", "Diploma", "ICT").with_minimum_grade("C-"),
            Program::new("100%_Law", "Degree", "Law").with_minimum_grade("B"),
        ] {
            store.insert_program(&program).expect("insert program");
        }
        store
    }

    #[test]
    fn filters_programs_in_sql() {
        let store = seeded();
        let all = store.query_programs(&ProgramFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, 1);

        let medicine = store
            .query_programs(&ProgramFilter {
                discipline_path: Some("medicine".into()),
                ..ProgramFilter::default()
            })
            .unwrap();
        assert_eq!(medicine.len(), 1);
        assert_eq!(medicine[0].minimum_cluster_points, 35.0);

        let search = store
            .query_programs(&ProgramFilter {
                search: Some("CLINICAL".into()),
                ..ProgramFilter::default()
            })
            .unwrap();
        assert_eq!(search.len(), 1);

        let literal = store
            .query_programs(&ProgramFilter {
                search: Some("100%_".into()),
                ..ProgramFilter::default()
            })
            .unwrap();
        assert_eq!(literal.len(), 1);
        assert_eq!(literal[0].name, "100%_Law");

        let exact = store.query_programs(&ProgramFilter::exact_grade("C")).unwrap();
        assert!(exact.is_empty());
        let exact = store.query_programs(&ProgramFilter::exact_grade("C-")).unwrap();
        assert_eq!(exact.len(), 1);

        assert_eq!(
            store.distinct_paths().unwrap(),
            vec!["ICT".to_string(), "Law".to_string(), "Medicine".to_string()]
        );
    }

    #[test]
    fn upsert_replaces_whole_record() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load_student("s1").unwrap().is_none());

        let mut record = StudentRecord::new("s1");
        record.mean_grade = Some("B".into());
        record.subjects = SubjectGradeSet::new().with(Subject::Biology, Grade::A);
        record.clusters = ClusterScoreSet {
            medicine: 12.0,
            engineering: 0.0,
            law: 0.0,
            arts: 0.0,
        };
        store.upsert_student(&record).unwrap();

        record.mean_grade = Some("C".into());
        record.subjects = SubjectGradeSet::new().with(Subject::English, Grade::B);
        record.clusters = ClusterScoreSet {
            medicine: 9.0,
            engineering: 9.0,
            law: 9.0,
            arts: 9.0,
        };
        store.upsert_student(&record).unwrap();

        let loaded = store.load_student("s1").unwrap().expect("record exists");
        assert_eq!(loaded.mean_grade.as_deref(), Some("C"));
        assert_eq!(loaded.subjects.points(Subject::Biology), 0);
        assert_eq!(loaded.subjects.points(Subject::English), 9);
        assert_eq!(loaded.clusters, record.clusters);
    }

    #[test]
    fn entitlement_defaults_to_locked() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(!store.unlocked("s1").unwrap());
        store.set_unlocked("s1", true).unwrap();
        assert!(tokio_test::block_on(store.is_unlocked("s1")).unwrap());
        store.set_unlocked("s1", false).unwrap();
        assert!(!store.unlocked("s1").unwrap());
    }
}
