use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Symbol for the wildcard requirement that every student meets.
pub const ANY_SYMBOL: &str = "Any";
pub const ANY_RANK: u8 = 0;
pub const LOWEST_RANK: u8 = 1;
pub const TOP_RANK: u8 = 12;

/// The twelve KCSE letter grades, lowest first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Grade {
    #[serde(rename = "E")]
    E,
    #[serde(rename = "D-")]
    DMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "A")]
    A,
}

impl Grade {
    pub const ALL: [Grade; 12] = [
        Grade::E,
        Grade::DMinus,
        Grade::D,
        Grade::DPlus,
        Grade::CMinus,
        Grade::C,
        Grade::CPlus,
        Grade::BMinus,
        Grade::B,
        Grade::BPlus,
        Grade::AMinus,
        Grade::A,
    ];

    pub fn rank(self) -> u8 {
        match self {
            Self::E => 1,
            Self::DMinus => 2,
            Self::D => 3,
            Self::DPlus => 4,
            Self::CMinus => 5,
            Self::C => 6,
            Self::CPlus => 7,
            Self::BMinus => 8,
            Self::B => 9,
            Self::BPlus => 10,
            Self::AMinus => 11,
            Self::A => 12,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::E => "E",
            Self::DMinus => "D-",
            Self::D => "D",
            Self::DPlus => "D+",
            Self::CMinus => "C-",
            Self::C => "C",
            Self::CPlus => "C+",
            Self::BMinus => "B-",
            Self::B => "B",
            Self::BPlus => "B+",
            Self::AMinus => "A-",
            Self::A => "A",
        }
    }

    /// Subject grades are stored as points, which share the rank numbering.
    pub fn points(self) -> u8 {
        self.rank()
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|g| g.rank() == rank)
    }

    pub fn from_points(points: u8) -> Result<Self, GradeScaleError> {
        Self::from_rank(points).ok_or(GradeScaleError::PointsOutOfRange(points))
    }

    pub fn next(self) -> Option<Self> {
        Self::from_rank(self.rank() + 1)
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradeScaleError {
    #[error("unknown grade symbol: {0:?}")]
    UnknownSymbol(String),
    #[error("grade points must be between 1 and 12, got {0}")]
    PointsOutOfRange(u8),
}

impl FromStr for Grade {
    type Err = GradeScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.symbol().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| GradeScaleError::UnknownSymbol(s.to_string()))
    }
}

/// Lookups over the full symbol table, including the `Any` sentinel.
pub struct GradeScale;

impl GradeScale {
    /// Strict lookup for data-entry paths. `Any` resolves to rank 0.
    pub fn rank(symbol: &str) -> Result<u8, GradeScaleError> {
        if symbol.trim().eq_ignore_ascii_case(ANY_SYMBOL) {
            return Ok(ANY_RANK);
        }
        symbol.parse::<Grade>().map(Grade::rank)
    }

    /// Read-path lookup for a student's own grade. Anything off the 12-symbol
    /// scale counts as the lowest grade, `Any` included since it only makes
    /// sense as a requirement.
    pub fn rank_or_lowest(symbol: &str) -> u8 {
        match symbol.parse::<Grade>().map(Grade::rank) {
            Ok(rank) => rank,
            Err(err) => {
                warn!("{err}; treating as rank {LOWEST_RANK}");
                LOWEST_RANK
            }
        }
    }

    pub fn symbol_at(rank: u8) -> Option<&'static str> {
        if rank == ANY_RANK {
            return Some(ANY_SYMBOL);
        }
        Grade::from_rank(rank).map(Grade::symbol)
    }

    /// Every symbol a student of `rank` satisfies, `Any` included.
    pub fn symbols_up_to(rank: u8) -> Vec<&'static str> {
        let mut symbols = vec![ANY_SYMBOL];
        symbols.extend(
            Grade::ALL
                .iter()
                .filter(|g| g.rank() <= rank)
                .map(|g| g.symbol()),
        );
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_form_strict_order_matching_table() {
        let expected = [
            "E", "D-", "D", "D+", "C-", "C", "C+", "B-", "B", "B+", "A-", "A",
        ];
        for (idx, symbol) in expected.iter().enumerate() {
            assert_eq!(GradeScale::rank(symbol).unwrap(), idx as u8 + 1);
        }
        for pair in Grade::ALL.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn any_is_rank_zero() {
        assert_eq!(GradeScale::rank("Any").unwrap(), 0);
        assert_eq!(GradeScale::rank("any").unwrap(), 0);
        assert_eq!(GradeScale::symbol_at(0), Some("Any"));
    }

    #[test]
    fn strict_lookup_rejects_unknown_symbols() {
        assert_eq!(
            GradeScale::rank("F"),
            Err(GradeScaleError::UnknownSymbol("F".to_string()))
        );
        assert!("A+".parse::<Grade>().is_err());
    }

    #[test]
    fn lenient_lookup_falls_back_to_lowest() {
        assert_eq!(GradeScale::rank_or_lowest("Z"), 1);
        assert_eq!(GradeScale::rank_or_lowest(""), 1);
        assert_eq!(GradeScale::rank_or_lowest("B+"), 10);
        assert_eq!(GradeScale::rank_or_lowest("Any"), 1);
    }

    #[test]
    fn points_round_trip_through_grade() {
        assert_eq!(Grade::from_points(7).unwrap(), Grade::CPlus);
        assert_eq!(Grade::from_points(0), Err(GradeScaleError::PointsOutOfRange(0)));
        assert_eq!(Grade::from_points(13), Err(GradeScaleError::PointsOutOfRange(13)));
    }

    #[test]
    fn symbols_up_to_includes_any_and_stops_at_rank() {
        let symbols = GradeScale::symbols_up_to(7);
        assert_eq!(
            symbols,
            vec!["Any", "E", "D-", "D", "D+", "C-", "C", "C+"]
        );
        assert!(!symbols.contains(&"B-"));
    }

    #[test]
    fn top_grade_has_no_successor() {
        assert_eq!(Grade::A.next(), None);
        assert_eq!(Grade::B.next(), Some(Grade::BPlus));
        assert_eq!(GradeScale::symbol_at(13), None);
    }
}
