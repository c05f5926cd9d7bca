use anyhow::Result;

use crate::catalog::Program;
use crate::grades::StudentRecord;
use crate::matching::QualifiedProgram;
use crate::recommend::Recommendation;

const PROGRAM_HEADER: [&str; 10] = [
    "section",
    "program",
    "level",
    "path",
    "min_mean_grade",
    "min_cluster_points",
    "family",
    "student_score",
    "gap",
    "chance",
];

fn program_record(section: &str, item: &QualifiedProgram) -> [String; 10] {
    [
        section.to_string(),
        item.program.name.clone(),
        item.program.level.clone(),
        item.program.discipline_path.clone(),
        item.program.minimum_mean_grade.clone(),
        format!("{:.1}", item.program.minimum_cluster_points),
        item.family.as_slug().to_string(),
        format!("{:.0}", item.student_score),
        format!("{:.1}", item.gap),
        item.chance_label.to_string(),
    ]
}

/// One row per listed program; `section` names the tier, `top_pick` or
/// `near_miss`.
pub fn recommendation_to_csv(result: &Recommendation) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(PROGRAM_HEADER)?;
    for item in &result.top_picks {
        writer.write_record(program_record("top_pick", item))?;
    }
    for (level, page) in result.qualified_programs_by_tier.tiers() {
        let section = level.to_string().to_lowercase();
        for item in &page.items {
            writer.write_record(program_record(&section, item))?;
        }
    }
    for item in &result.near_misses {
        writer.write_record(program_record("near_miss", item))?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn programs_to_csv(section: &str, programs: &[QualifiedProgram]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(PROGRAM_HEADER)?;
    for item in programs {
        writer.write_record(program_record(section, item))?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// Same column names the catalog CSV loader accepts.
pub fn catalog_to_csv(programs: &[Program]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "name",
        "level",
        "path",
        "min_mean_grade",
        "min_cluster_points",
        "description",
    ])?;
    for program in programs {
        writer.write_record([
            program.id.to_string(),
            program.name.clone(),
            program.level.clone(),
            program.discipline_path.clone(),
            program.minimum_mean_grade.clone(),
            program.minimum_cluster_points.to_string(),
            program.description.clone(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn clusters_to_csv(record: &StudentRecord) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["student_id", "mean_grade", "cluster", "points"])?;
    for (family, score) in record.clusters.iter() {
        writer.write_record([
            record.student_id.clone(),
            record.mean_grade_symbol().unwrap_or_default().to_string(),
            family.as_slug().to_string(),
            format!("{score:.0}"),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CsvCatalog;
    use crate::cluster::ClusterScoreSet;

    #[test]
    fn catalog_export_reads_back_through_loader() {
        let programs = vec![
            Program::new("BSc Nursing, KMTC", "Degree", "Medicine")
                .with_id(4)
                .with_minimum_grade("C+")
                .with_cluster_points(35.5),
        ];
        let exported = catalog_to_csv(&programs).unwrap();
        let catalog = CsvCatalog::from_reader(exported.as_bytes()).unwrap();
        assert_eq!(catalog.programs()[0].name, "BSc Nursing, KMTC");
        assert_eq!(catalog.programs()[0].minimum_cluster_points, 35.5);
        assert_eq!(catalog.programs()[0].id, 4);
    }

    #[test]
    fn cluster_rows_cover_every_family() {
        let mut record = StudentRecord::new("s1");
        record.mean_grade = Some("B".to_string());
        record.clusters = ClusterScoreSet {
            medicine: 30.0,
            engineering: 22.0,
            law: 28.0,
            arts: 27.0,
        };
        let csv = clusters_to_csv(&record).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "s1,B,medicine,30");
    }
}
