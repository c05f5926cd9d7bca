pub mod chance;
pub mod demand;
pub mod near_miss;
pub mod qualification;

use serde::{Deserialize, Serialize};

use crate::catalog::Program;
use crate::cluster::ClusterFamily;

pub use chance::{annotate, classify_chance, classify_family, top_picks, ChanceLabel, ChanceTone};
pub use demand::{demand_rank, sort_by_demand, DEFAULT_DEMAND_RANK};
pub use near_miss::{analyze_near_misses, near_miss_target};
pub use qualification::{grade_tokens, qualified_programs, qualifies};

/// A catalog program paired with one student's standing against it. Built
/// per request and never written back to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualifiedProgram {
    pub program: Program,
    pub family: ClusterFamily,
    pub demand_rank: u8,
    pub student_score: f64,
    pub gap: f64,
    pub chance_label: ChanceLabel,
    pub chance_weight: u8,
}
