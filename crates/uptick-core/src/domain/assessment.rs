//! Assessment report types.
//!
//! The report is produced once per session by the assessment generator and
//! is immutable afterwards. The wire shape is the strict JSON object the
//! language model is asked to return.

use serde::{Deserialize, Serialize};

/// Highest score a category can receive.
pub const MAX_SCORE: u8 = 100;

/// Score and feedback for a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFeedback {
    /// Score in `0..=100`.
    pub score: u8,
    pub feedback: String,
}

/// CEFR-like proficiency band reported by the assessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProficiencyLevel {
    Beginner,
    Elementary,
    Intermediate,
    #[serde(rename = "Upper-Intermediate")]
    UpperIntermediate,
    Advanced,
}

impl ProficiencyLevel {
    /// All levels, lowest first.
    pub const ALL: [Self; 5] = [
        Self::Beginner,
        Self::Elementary,
        Self::Intermediate,
        Self::UpperIntermediate,
        Self::Advanced,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Elementary => "Elementary",
            Self::Intermediate => "Intermediate",
            Self::UpperIntermediate => "Upper-Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall level and summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallAssessment {
    pub level: ProficiencyLevel,
    pub summary: String,
}

/// Structured score report for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub vocabulary: ScoreFeedback,
    pub grammar: ScoreFeedback,
    pub fluency: ScoreFeedback,
    pub overall: OverallAssessment,
}

impl AssessmentReport {
    /// Category scores in display order (vocabulary, grammar, fluency).
    pub fn categories(&self) -> [(&'static str, &ScoreFeedback); 3] {
        [
            ("vocabulary", &self.vocabulary),
            ("grammar", &self.grammar),
            ("fluency", &self.fluency),
        ]
    }

    /// Return the name of the first category whose score is out of range.
    #[must_use]
    pub fn out_of_range_category(&self) -> Option<&'static str> {
        self.categories()
            .into_iter()
            .find(|(_, c)| c.score > MAX_SCORE)
            .map(|(name, _)| name)
    }
}
