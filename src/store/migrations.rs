pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS programs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    level TEXT NOT NULL,
    path TEXT NOT NULL,
    min_mean_grade TEXT NOT NULL DEFAULT 'Any',
    min_cluster_points REAL NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT '',
    subject_requirements TEXT,
    career_path_info TEXT
);
CREATE INDEX IF NOT EXISTS idx_programs_path ON programs(path);
CREATE INDEX IF NOT EXISTS idx_programs_min_mean_grade ON programs(min_mean_grade);

CREATE TABLE IF NOT EXISTS student_grades (
    student_id TEXT PRIMARY KEY,
    mean_grade TEXT,
    subjects_json TEXT NOT NULL,
    cluster_medicine REAL NOT NULL DEFAULT 0,
    cluster_engineering REAL NOT NULL DEFAULT 0,
    cluster_law REAL NOT NULL DEFAULT 0,
    cluster_arts REAL NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS entitlements (
    student_id TEXT PRIMARY KEY,
    unlocked INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);
"#;
