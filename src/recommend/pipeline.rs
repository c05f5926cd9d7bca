use crate::catalog::{Program, ProgramLevel};
use crate::cluster::ClusterScoreSet;
use crate::config::ResultsConfig;
use crate::matching::{annotate, qualified_programs, sort_by_demand, QualifiedProgram};
use crate::recommend::pagination::paginate;
use crate::recommend::TieredPrograms;

/// Qualify, annotate and order a batch of catalog programs for one student.
pub fn rank_qualified(
    programs: Vec<Program>,
    student_rank: u8,
    clusters: &ClusterScoreSet,
) -> Vec<QualifiedProgram> {
    let mut ranked = qualified_programs(programs, student_rank)
        .into_iter()
        .map(|p| annotate(p, clusters))
        .collect::<Vec<_>>();
    sort_by_demand(&mut ranked);
    ranked
}

/// Splits ranked programs into level tiers. A program whose level names
/// more than one tier appears in each; one naming none is left out.
pub fn split_tiers(
    ranked: &[QualifiedProgram],
    page: Option<usize>,
    settings: &ResultsConfig,
) -> TieredPrograms {
    let tier = |level: ProgramLevel| {
        let members = ranked
            .iter()
            .filter(|p| level.matches(&p.program.level))
            .take(settings.tier_limit)
            .cloned()
            .collect::<Vec<_>>();
        paginate(&members, page, settings.page_size)
    };
    TieredPrograms {
        degree: tier(ProgramLevel::Degree),
        diploma: tier(ProgramLevel::Diploma),
        certificate: tier(ProgramLevel::Certificate),
        artisan: tier(ProgramLevel::Artisan),
    }
}
