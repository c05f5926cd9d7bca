use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recommend::RecommendationQuery;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Interest {
    #[serde(rename = "tech")]
    Technology,
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "build")]
    Building,
    #[serde(rename = "biz")]
    Business,
    #[serde(rename = "law")]
    Law,
    #[serde(rename = "art")]
    Art,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Strength {
    #[serde(rename = "math")]
    Mathematics,
    #[serde(rename = "bio")]
    Biology,
    #[serde(rename = "lang")]
    Languages,
    #[serde(rename = "biz")]
    Business,
    #[serde(rename = "tech")]
    Technical,
    #[serde(rename = "art")]
    Art,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkEnvironment {
    #[serde(rename = "office")]
    Office,
    #[serde(rename = "field")]
    Field,
    #[serde(rename = "lab")]
    Lab,
    #[serde(rename = "studio")]
    Studio,
    #[serde(rename = "remote")]
    Remote,
}

impl Interest {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Technology => "tech",
            Self::Health => "health",
            Self::Building => "build",
            Self::Business => "biz",
            Self::Law => "law",
            Self::Art => "art",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Technology => "Working with computers, code, and technology",
            Self::Health => "Helping sick people and understanding the human body",
            Self::Building => "Designing structures, machines, and fixing things",
            Self::Business => "Managing money, leading teams, and starting businesses",
            Self::Law => "Debating, fighting for justice, and reading history",
            Self::Art => "Creative design, music, fashion, or writing",
        }
    }
}

impl Strength {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Mathematics => "math",
            Self::Biology => "bio",
            Self::Languages => "lang",
            Self::Business => "biz",
            Self::Technical => "tech",
            Self::Art => "art",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Mathematics => "Mathematics & Physics",
            Self::Biology => "Biology & Chemistry",
            Self::Languages => "English, History & Languages",
            Self::Business => "Business Studies & Economics",
            Self::Technical => "Computer Studies & Technical Subjects",
            Self::Art => "Art & Design or Music",
        }
    }
}

impl WorkEnvironment {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Field => "field",
            Self::Lab => "lab",
            Self::Studio => "studio",
            Self::Remote => "remote",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Office => "In a modern office or corporate setting",
            Self::Field => "Outdoors, construction sites, or farms",
            Self::Lab => "In a laboratory or hospital",
            Self::Studio => "In a creative studio or media house",
            Self::Remote => "Working from home / Remote",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown {question} answer: {value}")]
pub struct QuizParseError {
    pub question: &'static str,
    pub value: String,
}

impl FromStr for Interest {
    type Err = QuizParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "tech" | "technology" => Ok(Self::Technology),
            "health" => Ok(Self::Health),
            "build" | "building" => Ok(Self::Building),
            "biz" | "business" => Ok(Self::Business),
            "law" => Ok(Self::Law),
            "art" | "arts" => Ok(Self::Art),
            _ => Err(QuizParseError {
                question: "interest",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Strength {
    type Err = QuizParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "math" | "maths" | "mathematics" => Ok(Self::Mathematics),
            "bio" | "biology" => Ok(Self::Biology),
            "lang" | "languages" => Ok(Self::Languages),
            "biz" | "business" => Ok(Self::Business),
            "tech" | "technical" => Ok(Self::Technical),
            "art" | "arts" => Ok(Self::Art),
            _ => Err(QuizParseError {
                question: "strength",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for WorkEnvironment {
    type Err = QuizParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "office" => Ok(Self::Office),
            "field" | "outdoors" => Ok(Self::Field),
            "lab" | "laboratory" => Ok(Self::Lab),
            "studio" => Ok(Self::Studio),
            "remote" | "home" => Ok(Self::Remote),
            _ => Err(QuizParseError {
                question: "environment",
                value: s.to_string(),
            }),
        }
    }
}

impl Display for Interest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

impl Display for Strength {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

impl Display for WorkEnvironment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizAnswers {
    pub interest: Interest,
    pub strength: Strength,
    pub environment: WorkEnvironment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizOutcome {
    pub answers: QuizAnswers,
    pub recommended_path: String,
}

impl QuizAnswers {
    /// Rules are tried top to bottom; anything unmatched lands in Arts.
    pub fn recommended_path(&self) -> &'static str {
        use Interest as I;
        use Strength as S;
        use WorkEnvironment as E;

        let (interest, strength, env) = (self.interest, self.strength, self.environment);
        if interest == I::Health || (strength == S::Biology && matches!(env, E::Lab | E::Field)) {
            "Medicine"
        } else if interest == I::Building || (strength == S::Mathematics && env == E::Field) {
            "Engineering"
        } else if interest == I::Technology || (strength == S::Technical && env == E::Remote) {
            "ICT"
        } else if interest == I::Business || (strength == S::Business && env == E::Office) {
            "Business"
        } else if interest == I::Law || (strength == S::Languages && env == E::Office) {
            "Law"
        } else if env == E::Field && strength == S::Biology {
            "Agriculture"
        } else {
            "Arts"
        }
    }

    pub fn outcome(&self) -> QuizOutcome {
        QuizOutcome {
            answers: *self,
            recommended_path: self.recommended_path().to_string(),
        }
    }

    /// A recommendation query narrowed to the suggested discipline.
    pub fn to_query(&self, student_id: impl Into<String>) -> RecommendationQuery {
        RecommendationQuery {
            discipline: Some(self.recommended_path().to_string()),
            ..RecommendationQuery::for_student(student_id)
        }
    }
}
