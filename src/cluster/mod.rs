pub mod calculator;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use calculator::{calculate_clusters, family_score};

/// The four cluster-scoring formulas a program can be scored against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ClusterFamily {
    Medicine,
    Engineering,
    Law,
    Arts,
}

impl ClusterFamily {
    pub const ALL: [ClusterFamily; 4] = [
        ClusterFamily::Medicine,
        ClusterFamily::Engineering,
        ClusterFamily::Law,
        ClusterFamily::Arts,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Medicine => "medicine",
            Self::Engineering => "engineering",
            Self::Law => "law",
            Self::Arts => "arts",
        }
    }
}

impl Display for ClusterFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Medicine => "Medicine",
            Self::Engineering => "Engineering/Science/ICT/Agriculture",
            Self::Law => "Law",
            Self::Arts => "Arts/General",
        };
        write!(f, "{display}")
    }
}

/// Derived cluster points, one per family. Always produced as a whole by
/// [`calculate_clusters`]; never edited field by field.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterScoreSet {
    pub medicine: f64,
    pub engineering: f64,
    pub law: f64,
    pub arts: f64,
}

impl ClusterScoreSet {
    pub fn score(&self, family: ClusterFamily) -> f64 {
        match family {
            ClusterFamily::Medicine => self.medicine,
            ClusterFamily::Engineering => self.engineering,
            ClusterFamily::Law => self.law,
            ClusterFamily::Arts => self.arts,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClusterFamily, f64)> + '_ {
        ClusterFamily::ALL.iter().map(move |f| (*f, self.score(*f)))
    }
}
