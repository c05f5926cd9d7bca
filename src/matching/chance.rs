use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::catalog::Program;
use crate::cluster::{ClusterFamily, ClusterScoreSet};
use crate::matching::demand::demand_rank;
use crate::matching::QualifiedProgram;

/// Keyword → cluster family, checked in order against the lowercased path.
static FAMILY_KEYWORDS: [(&str, ClusterFamily); 6] = [
    ("med", ClusterFamily::Medicine),
    ("engin", ClusterFamily::Engineering),
    ("sci", ClusterFamily::Engineering),
    ("agri", ClusterFamily::Engineering),
    ("ict", ClusterFamily::Engineering),
    ("law", ClusterFamily::Law),
];

const HIGHLY_LIKELY_GAP: f64 = 5.0;
const REACH_GAP: f64 = -2.0;

/// Serialized with the same text `Display` renders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ChanceLabel {
    Qualified,
    #[serde(rename = "Highly Likely")]
    HighlyLikely,
    Competitive,
    #[serde(rename = "Reach (Risky)")]
    Reach,
    #[serde(rename = "Low Chance")]
    LowChance,
    #[serde(rename = "Missed by 1 Grade")]
    MissedByOneGrade,
}

/// Display tone for a label, independent of any particular renderer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChanceTone {
    Success,
    Warning,
    Danger,
    Muted,
}

impl ChanceLabel {
    pub fn weight(self) -> u8 {
        match self {
            Self::HighlyLikely => 20,
            Self::Competitive => 15,
            Self::Qualified => 10,
            Self::Reach => 5,
            Self::LowChance | Self::MissedByOneGrade => 0,
        }
    }

    pub fn tone(self) -> ChanceTone {
        match self {
            Self::Qualified | Self::HighlyLikely => ChanceTone::Success,
            Self::Competitive => ChanceTone::Warning,
            Self::Reach => ChanceTone::Danger,
            Self::LowChance | Self::MissedByOneGrade => ChanceTone::Muted,
        }
    }
}

impl Display for ChanceLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Qualified => "Qualified",
            Self::HighlyLikely => "Highly Likely",
            Self::Competitive => "Competitive",
            Self::Reach => "Reach (Risky)",
            Self::LowChance => "Low Chance",
            Self::MissedByOneGrade => "Missed by 1 Grade",
        };
        write!(f, "{display}")
    }
}

pub fn classify_family(discipline_path: &str) -> ClusterFamily {
    let path = discipline_path.to_lowercase();
    FAMILY_KEYWORDS
        .iter()
        .find(|(keyword, _)| path.contains(keyword))
        .map(|(_, family)| *family)
        .unwrap_or(ClusterFamily::Arts)
}

/// A zero threshold means the program enforces no cluster cut-off.
pub fn classify_chance(minimum_cluster_points: f64, gap: f64) -> ChanceLabel {
    if minimum_cluster_points == 0.0 {
        ChanceLabel::Qualified
    } else if gap >= HIGHLY_LIKELY_GAP {
        ChanceLabel::HighlyLikely
    } else if gap >= 0.0 {
        ChanceLabel::Competitive
    } else if gap >= REACH_GAP {
        ChanceLabel::Reach
    } else {
        ChanceLabel::LowChance
    }
}

pub fn annotate(program: Program, clusters: &ClusterScoreSet) -> QualifiedProgram {
    let family = classify_family(&program.discipline_path);
    let student_score = clusters.score(family);
    let gap = student_score - program.minimum_cluster_points;
    let chance_label = classify_chance(program.minimum_cluster_points, gap);
    QualifiedProgram {
        demand_rank: demand_rank(&program.discipline_path),
        family,
        student_score,
        gap,
        chance_weight: chance_label.weight(),
        chance_label,
        program,
    }
}

/// Best `limit` programs by chance weight; the incoming demand order is kept
/// within equal weights.
pub fn top_picks(programs: &[QualifiedProgram], limit: usize) -> Vec<QualifiedProgram> {
    let mut picks = programs.to_vec();
    picks.sort_by(|a, b| {
        b.chance_weight
            .cmp(&a.chance_weight)
            .then_with(|| a.demand_rank.cmp(&b.demand_rank))
    });
    picks.truncate(limit);
    picks
}
