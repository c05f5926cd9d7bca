use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::catalog::Program;
use crate::grades::{Grade, StudentRecord};
use crate::matching::{ChanceLabel, ChanceTone, QualifiedProgram};
use crate::quiz::QuizOutcome;
use crate::recommend::{Recommendation, TieredPrograms};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn chance_cell(label: ChanceLabel) -> Cell {
    let color = match label.tone() {
        ChanceTone::Success => Color::Green,
        ChanceTone::Warning => Color::Yellow,
        ChanceTone::Danger => Color::Red,
        ChanceTone::Muted => Color::DarkGrey,
    };
    Cell::new(label.to_string()).fg(color)
}

fn cutoff_label(points: f64) -> String {
    if points == 0.0 {
        "-".to_string()
    } else {
        format!("{points:.1}")
    }
}

/// Subject grades followed by the four cluster totals.
pub fn render_student_table(record: &StudentRecord) -> String {
    let mut table = new_table();
    table.set_header(vec!["Subject", "Grade", "Points"]);
    for (subject, points) in record.subjects.iter() {
        let grade = Grade::from_rank(points)
            .map(|g| g.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![subject.to_string(), grade, points.to_string()]);
    }

    let mut out = format!(
        "Student: {}\nMean grade: {}\n",
        record.student_id,
        record.mean_grade_symbol().unwrap_or("-")
    );
    out.push_str(&table.to_string());
    out.push('\n');
    out.push_str(&render_clusters_table(record));
    out
}

pub fn render_clusters_table(record: &StudentRecord) -> String {
    let mut table = new_table();
    table.set_header(vec!["Cluster", "Points", "Of 48"]);
    for (family, score) in record.clusters.iter() {
        table.add_row(vec![
            family.to_string(),
            format!("{score:.0}"),
            format!("{:.0}%", score / 48.0 * 100.0),
        ]);
    }
    table.to_string()
}

pub fn render_programs_table(programs: &[QualifiedProgram]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Program",
        "Level",
        "Path",
        "Min Grade",
        "Cut-off",
        "Your Points",
        "Gap",
        "Chance",
    ]);
    for item in programs {
        let program = &item.program;
        table.add_row(Row::from(vec![
            Cell::new(&program.name),
            Cell::new(&program.level),
            Cell::new(&program.discipline_path),
            Cell::new(&program.minimum_mean_grade),
            Cell::new(cutoff_label(program.minimum_cluster_points)),
            Cell::new(format!("{:.0} ({})", item.student_score, item.family)),
            Cell::new(format!("{:+.1}", item.gap)),
            chance_cell(item.chance_label),
        ]));
    }
    table.to_string()
}

pub fn render_tiers(tiers: &TieredPrograms) -> String {
    let mut out = String::new();
    for (level, page) in tiers.tiers() {
        if page.total_items == 0 {
            continue;
        }
        out.push_str(&format!(
            "\n{level} programs ({} total, page {}/{})\n",
            page.total_items, page.page, page.total_pages
        ));
        out.push_str(&render_programs_table(&page.items));
        out.push('\n');
    }
    if out.is_empty() {
        out.push_str("No programs match your grades and filters.\n");
    }
    out
}

pub fn render_recommendation(result: &Recommendation) -> String {
    let mut out = format!(
        "Student: {}  Mean grade: {}\n",
        result.student_id, result.mean_grade
    );
    let mut clusters = new_table();
    clusters.set_header(vec!["Medicine", "Engineering", "Law", "Arts"]);
    clusters.add_row(vec![
        format!("{:.0}", result.clusters.medicine),
        format!("{:.0}", result.clusters.engineering),
        format!("{:.0}", result.clusters.law),
        format!("{:.0}", result.clusters.arts),
    ]);
    out.push_str(&clusters.to_string());
    out.push('\n');

    if !result.top_picks.is_empty() {
        out.push_str("\nTop picks\n");
        out.push_str(&render_programs_table(&result.top_picks));
        out.push('\n');
    }
    out.push_str(&render_tiers(&result.qualified_programs_by_tier));
    if !result.near_misses.is_empty() {
        out.push_str("\nOne grade away\n");
        out.push_str(&render_programs_table(&result.near_misses));
        out.push('\n');
    }
    out
}

pub fn render_catalog_table(programs: &[Program]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "ID",
        "Program",
        "Level",
        "Path",
        "Min Grade",
        "Cut-off",
    ]);
    for program in programs {
        table.add_row(vec![
            program.id.to_string(),
            program.name.clone(),
            program.level.clone(),
            program.discipline_path.clone(),
            program.minimum_mean_grade.clone(),
            cutoff_label(program.minimum_cluster_points),
        ]);
    }
    table.to_string()
}

pub fn render_quiz_table(outcome: &QuizOutcome) -> String {
    let mut table = new_table();
    table.set_header(vec!["Question", "Answer"]);
    table.add_row(vec!["Interest", outcome.answers.interest.prompt()]);
    table.add_row(vec!["Strength", outcome.answers.strength.prompt()]);
    table.add_row(vec!["Environment", outcome.answers.environment.prompt()]);
    format!(
        "{}\nRecommended path: {}",
        table, outcome.recommended_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterScoreSet;
    use crate::grades::{Subject, SubjectGradeSet};
    use crate::matching::annotate;

    #[test]
    fn programs_table_shows_labels_and_gaps() {
        let clusters = ClusterScoreSet {
            medicine: 30.0,
            ..ClusterScoreSet::default()
        };
        let nursing = annotate(
            Program::new("BSc Nursing", "Degree", "Medicine").with_cluster_points(32.0),
            &clusters,
        );
        let rendered = render_programs_table(&[nursing]);
        assert!(rendered.contains("BSc Nursing"));
        assert!(rendered.contains("Reach (Risky)"));
        assert!(rendered.contains("-2.0"));
    }

    #[test]
    fn student_table_lists_subjects_and_clusters() {
        let mut record = StudentRecord::new("s1");
        record.mean_grade = Some("B".to_string());
        record.subjects = SubjectGradeSet::new().with(Subject::Biology, Grade::BPlus);
        let rendered = render_student_table(&record);
        assert!(rendered.contains("Mean grade: B"));
        assert!(rendered.contains("B+"));
        assert!(rendered.contains("Engineering"));
    }
}
