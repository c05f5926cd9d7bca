use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grades::scale::{Grade, GradeScaleError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SubjectGroup {
    Compulsory,
    Sciences,
    Humanities,
    Technical,
    LanguagesAndBusiness,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Mathematics,
    English,
    Kiswahili,
    Biology,
    Physics,
    Chemistry,
    History,
    Geography,
    Cre,
    Ire,
    Hre,
    HomeScience,
    ArtAndDesign,
    Agriculture,
    Woodwork,
    Metalwork,
    BuildingConstruction,
    PowerMechanics,
    Electricity,
    DrawingAndDesign,
    ComputerStudies,
    AviationTechnology,
    French,
    German,
    Arabic,
    KenyanSignLanguage,
    Music,
    BusinessStudies,
}

impl Subject {
    pub const ALL: [Subject; 28] = [
        Subject::Mathematics,
        Subject::English,
        Subject::Kiswahili,
        Subject::Biology,
        Subject::Physics,
        Subject::Chemistry,
        Subject::History,
        Subject::Geography,
        Subject::Cre,
        Subject::Ire,
        Subject::Hre,
        Subject::HomeScience,
        Subject::ArtAndDesign,
        Subject::Agriculture,
        Subject::Woodwork,
        Subject::Metalwork,
        Subject::BuildingConstruction,
        Subject::PowerMechanics,
        Subject::Electricity,
        Subject::DrawingAndDesign,
        Subject::ComputerStudies,
        Subject::AviationTechnology,
        Subject::French,
        Subject::German,
        Subject::Arabic,
        Subject::KenyanSignLanguage,
        Subject::Music,
        Subject::BusinessStudies,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Mathematics => "mathematics",
            Self::English => "english",
            Self::Kiswahili => "kiswahili",
            Self::Biology => "biology",
            Self::Physics => "physics",
            Self::Chemistry => "chemistry",
            Self::History => "history",
            Self::Geography => "geography",
            Self::Cre => "cre",
            Self::Ire => "ire",
            Self::Hre => "hre",
            Self::HomeScience => "home_science",
            Self::ArtAndDesign => "art_and_design",
            Self::Agriculture => "agriculture",
            Self::Woodwork => "woodwork",
            Self::Metalwork => "metalwork",
            Self::BuildingConstruction => "building_construction",
            Self::PowerMechanics => "power_mechanics",
            Self::Electricity => "electricity",
            Self::DrawingAndDesign => "drawing_and_design",
            Self::ComputerStudies => "computer_studies",
            Self::AviationTechnology => "aviation_technology",
            Self::French => "french",
            Self::German => "german",
            Self::Arabic => "arabic",
            Self::KenyanSignLanguage => "kenyan_sign_language",
            Self::Music => "music",
            Self::BusinessStudies => "business_studies",
        }
    }

    pub fn group(&self) -> SubjectGroup {
        match self {
            Self::Mathematics | Self::English | Self::Kiswahili => SubjectGroup::Compulsory,
            Self::Biology | Self::Physics | Self::Chemistry => SubjectGroup::Sciences,
            Self::History | Self::Geography | Self::Cre | Self::Ire | Self::Hre => {
                SubjectGroup::Humanities
            }
            Self::HomeScience
            | Self::ArtAndDesign
            | Self::Agriculture
            | Self::Woodwork
            | Self::Metalwork
            | Self::BuildingConstruction
            | Self::PowerMechanics
            | Self::Electricity
            | Self::DrawingAndDesign
            | Self::ComputerStudies
            | Self::AviationTechnology => SubjectGroup::Technical,
            Self::French
            | Self::German
            | Self::Arabic
            | Self::KenyanSignLanguage
            | Self::Music
            | Self::BusinessStudies => SubjectGroup::LanguagesAndBusiness,
        }
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Cre => "CRE",
            Self::Ire => "IRE",
            Self::Hre => "HRE",
            Self::Mathematics => "Mathematics",
            Self::English => "English",
            Self::Kiswahili => "Kiswahili",
            Self::Biology => "Biology",
            Self::Physics => "Physics",
            Self::Chemistry => "Chemistry",
            Self::History => "History",
            Self::Geography => "Geography",
            Self::HomeScience => "Home Science",
            Self::ArtAndDesign => "Art and Design",
            Self::Agriculture => "Agriculture",
            Self::Woodwork => "Woodwork",
            Self::Metalwork => "Metalwork",
            Self::BuildingConstruction => "Building Construction",
            Self::PowerMechanics => "Power Mechanics",
            Self::Electricity => "Electricity",
            Self::DrawingAndDesign => "Drawing and Design",
            Self::ComputerStudies => "Computer Studies",
            Self::AviationTechnology => "Aviation Technology",
            Self::French => "French",
            Self::German => "German",
            Self::Arabic => "Arabic",
            Self::KenyanSignLanguage => "Kenyan Sign Language",
            Self::Music => "Music",
            Self::BusinessStudies => "Business Studies",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown subject: {0}")]
pub struct SubjectParseError(pub String);

impl FromStr for Subject {
    type Err = SubjectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace(['-', ' '], "_");
        let subject = match normalized.as_str() {
            "maths" | "math" => Some(Self::Mathematics),
            "business" => Some(Self::BusinessStudies),
            "computer" | "computers" => Some(Self::ComputerStudies),
            "ksl" => Some(Self::KenyanSignLanguage),
            other => Self::ALL.iter().copied().find(|s| s.as_slug() == other),
        };
        subject.ok_or_else(|| SubjectParseError(s.to_string()))
    }
}

/// Per-subject points for one student. Subjects never entered are simply
/// absent and read back as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SubjectGradeSet {
    points: BTreeMap<Subject, u8>,
}

impl SubjectGradeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, subject: Subject, grade: Grade) -> Self {
        self.points.insert(subject, grade.points());
        self
    }

    pub fn set_points(&mut self, subject: Subject, points: u8) -> Result<(), GradeScaleError> {
        let grade = Grade::from_points(points)?;
        self.points.insert(subject, grade.points());
        Ok(())
    }

    pub fn set_grade(&mut self, subject: Subject, grade: Grade) {
        self.points.insert(subject, grade.points());
    }

    pub fn get(&self, subject: Subject) -> Option<u8> {
        self.points.get(&subject).copied()
    }

    pub fn points(&self, subject: Subject) -> u8 {
        self.get(subject).unwrap_or(0)
    }

    /// Best score among `subjects`, zero when none are set.
    pub fn best_of(&self, subjects: &[Subject]) -> u8 {
        subjects
            .iter()
            .map(|s| self.points(*s))
            .max()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subject, u8)> + '_ {
        self.points.iter().map(|(s, p)| (*s, *p))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
