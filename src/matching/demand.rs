use crate::matching::QualifiedProgram;

pub const DEFAULT_DEMAND_RANK: u8 = 20;

/// Market-demand priority by discipline keyword, first match wins.
static DEMAND_TIERS: [(&str, u8); 5] = [
    ("medicine", 1),
    ("engineering", 2),
    ("ict", 3),
    ("law", 4),
    ("business", 5),
];

pub fn demand_rank(discipline_path: &str) -> u8 {
    let path = discipline_path.to_lowercase();
    DEMAND_TIERS
        .iter()
        .find(|(keyword, _)| path.contains(keyword))
        .map(|(_, rank)| *rank)
        .unwrap_or(DEFAULT_DEMAND_RANK)
}

/// Stable display ordering: demand tier, then program name.
pub fn sort_by_demand(programs: &mut [QualifiedProgram]) {
    programs.sort_by(|a, b| {
        a.demand_rank
            .cmp(&b.demand_rank)
            .then_with(|| a.program.name.cmp(&b.program.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Program;
    use crate::cluster::ClusterScoreSet;
    use crate::matching::annotate;

    #[test]
    fn ranks_follow_fixed_precedence() {
        assert_eq!(demand_rank("Medicine"), 1);
        assert_eq!(demand_rank("Engineering & Technology"), 2);
        assert_eq!(demand_rank("ICT"), 3);
        assert_eq!(demand_rank("law"), 4);
        assert_eq!(demand_rank("Business"), 5);
        assert_eq!(demand_rank("Hospitality"), DEFAULT_DEMAND_RANK);
    }

    #[test]
    fn first_keyword_wins_for_mixed_paths() {
        assert_eq!(demand_rank("Business Law"), 4);
        assert_eq!(demand_rank("Medicine and Engineering"), 1);
    }

    #[test]
    fn ties_break_on_name() {
        let clusters = ClusterScoreSet::default();
        let mut programs = [
            Program::new("Zoology", "Degree", "Science"),
            Program::new("LLB", "Degree", "Law"),
            Program::new("Anatomy", "Degree", "Arts"),
            Program::new("MBChB", "Degree", "Medicine"),
        ]
        .into_iter()
        .map(|program| annotate(program, &clusters))
        .collect::<Vec<_>>();
        sort_by_demand(&mut programs);
        let names = programs.iter().map(|p| p.program.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["MBChB", "LLB", "Anatomy", "Zoology"]);
    }
}
