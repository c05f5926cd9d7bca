use crate::catalog::Program;
use crate::cluster::ClusterScoreSet;
use crate::grades::GradeScale;
use crate::matching::chance::{annotate, ChanceLabel};
use crate::matching::demand::sort_by_demand;
use crate::matching::QualifiedProgram;

/// The grade one step above `student_rank`, or `None` at the top of the scale.
pub fn near_miss_target(student_rank: u8) -> Option<&'static str> {
    GradeScale::symbol_at(student_rank.checked_add(1)?)
}

/// Programs whose requirement is exactly one grade above the student.
///
/// Unlike qualification this is an exact comparison of the stored
/// requirement text, so composite requirements never show up here.
pub fn analyze_near_misses(
    programs: Vec<Program>,
    student_rank: u8,
    clusters: &ClusterScoreSet,
    limit: usize,
) -> Vec<QualifiedProgram> {
    let Some(target) = near_miss_target(student_rank) else {
        return Vec::new();
    };
    let mut misses = programs
        .into_iter()
        .filter(|p| p.minimum_mean_grade.trim() == target)
        .map(|p| {
            let mut annotated = annotate(p, clusters);
            annotated.chance_label = ChanceLabel::MissedByOneGrade;
            annotated.chance_weight = ChanceLabel::MissedByOneGrade.weight();
            annotated
        })
        .collect::<Vec<_>>();
    sort_by_demand(&mut misses);
    misses.truncate(limit);
    misses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::Grade;

    fn catalog() -> Vec<Program> {
        let mut programs = vec![
            Program::new("BCom", "Degree", "Business").with_minimum_grade("B-"),
            Program::new("MBChB", "Degree", "Medicine")
                .with_minimum_grade("B-")
                .with_cluster_points(40.0),
            Program::new("Diploma in Law", "Diploma", "Law").with_minimum_grade("C+"),
            Program::new("Mixed", "Degree", "Arts").with_minimum_grade("B- or C+"),
        ];
        for idx in 0..6 {
            programs.push(
                Program::new(&format!("BA Option {idx}"), "Degree", "Arts").with_minimum_grade("B-"),
            );
        }
        programs
    }

    #[test]
    fn targets_exactly_one_rank_up() {
        assert_eq!(near_miss_target(Grade::CPlus.rank()), Some("B-"));
        assert_eq!(near_miss_target(Grade::E.rank()), Some("D-"));
        assert_eq!(near_miss_target(Grade::A.rank()), None);
    }

    #[test]
    fn caps_results_and_orders_by_demand() {
        let clusters = ClusterScoreSet {
            medicine: 36.0,
            ..ClusterScoreSet::default()
        };
        let misses = analyze_near_misses(catalog(), Grade::CPlus.rank(), &clusters, 5);
        assert_eq!(misses.len(), 5);
        assert!(misses.iter().all(|m| m.program.minimum_mean_grade == "B-"));
        assert!(misses
            .iter()
            .all(|m| m.chance_label == ChanceLabel::MissedByOneGrade));
        assert_eq!(misses[0].program.name, "MBChB");
        assert_eq!(misses[0].gap, -4.0);
        assert_eq!(misses[1].program.name, "BCom");
    }

    #[test]
    fn excludes_composite_requirements() {
        let misses = analyze_near_misses(catalog(), Grade::CPlus.rank(), &ClusterScoreSet::default(), 50);
        assert!(misses.iter().all(|m| m.program.name != "Mixed"));
        assert_eq!(misses.len(), 8);
    }

    #[test]
    fn top_grade_has_no_near_misses() {
        let programs = vec![Program::new("X", "Degree", "Arts").with_minimum_grade("A")];
        assert!(analyze_near_misses(programs, Grade::A.rank(), &ClusterScoreSet::default(), 5).is_empty());
    }
}
