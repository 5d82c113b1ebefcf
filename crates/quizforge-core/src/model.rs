//! Core data model types for quizforge.
//!
//! These are the fundamental types the rest of the system shares: question
//! records and their classification tags, selection rules produced by the
//! matrix parser, and the scoring/duration configuration of an exam.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three fixed kinds of question an exam can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalseSet,
    ShortAnswer,
}

impl QuestionType {
    /// Section order used when assembling an exam.
    pub const ALL: [QuestionType; 3] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalseSet,
        QuestionType::ShortAnswer,
    ];

    /// One-character marker used by the difficulty override fields.
    pub fn marker(self) -> char {
        match self {
            QuestionType::MultipleChoice => 'M',
            QuestionType::TrueFalseSet => 'T',
            QuestionType::ShortAnswer => 'S',
        }
    }

    /// Resolve a marker character (case-insensitive).
    pub fn from_marker(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'M' => Some(QuestionType::MultipleChoice),
            'T' => Some(QuestionType::TrueFalseSet),
            'S' => Some(QuestionType::ShortAnswer),
            _ => None,
        }
    }

    /// Human-readable section title.
    pub fn title(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple choice",
            QuestionType::TrueFalseSet => "True/false set",
            QuestionType::ShortAnswer => "Short answer",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "multiple-choice"),
            QuestionType::TrueFalseSet => write!(f, "true-false-set"),
            QuestionType::ShortAnswer => write!(f, "short-answer"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "multiple-choice" | "mc" | "m" => Ok(QuestionType::MultipleChoice),
            "true-false-set" | "true-false" | "tf" | "t" => Ok(QuestionType::TrueFalseSet),
            "short-answer" | "sa" | "s" => Ok(QuestionType::ShortAnswer),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Parsed form of a `"<grade>.<topic>[.<tier>]"` classification string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassTag {
    pub grade: u32,
    pub topic: u32,
    pub tier: u8,
    raw: String,
}

impl ClassTag {
    /// The original tag text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this tag belongs to the given grade and topic.
    pub fn matches(&self, grade: u32, topic: u32) -> bool {
        self.grade == grade && self.topic == topic
    }
}

impl FromStr for ClassTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let segments: Vec<&str> = raw.split('.').map(str::trim).collect();
        if segments.len() < 2 {
            return Err(format!(
                "class tag '{raw}' needs at least grade and topic segments"
            ));
        }

        let grade = segments[0]
            .parse::<u32>()
            .map_err(|_| format!("class tag '{raw}' has a non-numeric grade"))?;
        let topic = segments[1]
            .parse::<u32>()
            .map_err(|_| format!("class tag '{raw}' has a non-numeric topic"))?;

        // Two-segment tags carry no tier; anything unparsable falls back to 1.
        let tier = if segments.len() >= 3 {
            segments
                .last()
                .and_then(|t| t.parse::<u8>().ok())
                .unwrap_or(1)
        } else {
            1
        };

        Ok(ClassTag {
            grade,
            topic,
            tier,
            raw: raw.to_string(),
        })
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ClassTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ClassTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One statement of a true/false set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub text: String,
    pub is_true: bool,
}

/// Type-specific content of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        correct_option: String,
    },
    TrueFalseSet {
        statements: Vec<Statement>,
    },
    ShortAnswer {
        correct_answer: String,
    },
}

/// An immutable entry of the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: u32,
    #[serde(rename = "class")]
    pub class_tag: ClassTag,
    /// Display text; may embed math markup that is opaque here.
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl QuestionRecord {
    pub fn question_type(&self) -> QuestionType {
        match self.kind {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::TrueFalseSet { .. } => QuestionType::TrueFalseSet,
            QuestionKind::ShortAnswer { .. } => QuestionType::ShortAnswer,
        }
    }

    pub fn tier(&self) -> u8 {
        self.class_tag.tier
    }
}

/// A request for `count` questions of one type from one grade/topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRule {
    pub question_type: QuestionType,
    pub grade: u32,
    pub topic: u32,
    pub count: u32,
    /// Tier segment written in the rule, when the four-segment form is used.
    #[serde(default)]
    pub difficulty_tier: Option<u8>,
}

impl fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.difficulty_tier {
            Some(tier) => write!(
                f,
                "{} {}.{}.{}.{}",
                self.question_type.marker(),
                self.grade,
                self.topic,
                tier,
                self.count
            ),
            None => write!(
                f,
                "{} {}.{}.{}",
                self.question_type.marker(),
                self.grade,
                self.topic,
                self.count
            ),
        }
    }
}

/// How many questions of a rule must come from a specific difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierOverride {
    pub question_type: QuestionType,
    pub grade: u32,
    pub topic: u32,
    pub tier: u8,
    pub count: u32,
}

/// The raw matrix as delivered by the exam service.
///
/// Every field is independently optional; an absent or blank section field
/// simply produces no rules for that section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixSpec {
    #[serde(default)]
    pub multiple_choice: Option<String>,
    #[serde(default)]
    pub true_false: Option<String>,
    #[serde(default)]
    pub short_answer: Option<String>,
    #[serde(default)]
    pub tier3: Option<String>,
    #[serde(default)]
    pub tier4: Option<String>,
    /// Exam duration in minutes.
    #[serde(default)]
    pub duration_minutes: f64,
}

impl MatrixSpec {
    /// The section field for a question type.
    pub fn section(&self, question_type: QuestionType) -> Option<&str> {
        match question_type {
            QuestionType::MultipleChoice => self.multiple_choice.as_deref(),
            QuestionType::TrueFalseSet => self.true_false.as_deref(),
            QuestionType::ShortAnswer => self.short_answer.as_deref(),
        }
    }
}

/// Point value and item count of one exam section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Total points for the whole section.
    pub points: f64,
    /// Number of items the section was configured for.
    pub count: u32,
}

/// Scoring and timing parameters of an exam, fixed once an attempt starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamConfig {
    pub multiple_choice: SectionConfig,
    pub true_false: SectionConfig,
    pub short_answer: SectionConfig,
    pub duration_secs: u64,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            multiple_choice: SectionConfig::default(),
            true_false: SectionConfig::default(),
            short_answer: SectionConfig::default(),
            duration_secs: default_duration_secs(),
        }
    }
}

fn default_duration_secs() -> u64 {
    45 * 60
}

impl ExamConfig {
    /// Build a free-practice configuration from user-entered numbers.
    pub fn practice(
        counts: [u32; 3],
        points: [f64; 3],
        duration_minutes: u32,
    ) -> Self {
        let [mc, tf, sa] = counts;
        let [mc_points, tf_points, sa_points] = points;
        Self {
            multiple_choice: SectionConfig {
                points: mc_points,
                count: mc,
            },
            true_false: SectionConfig {
                points: tf_points,
                count: tf,
            },
            short_answer: SectionConfig {
                points: sa_points,
                count: sa,
            },
            duration_secs: u64::from(duration_minutes) * 60,
        }
    }

    pub fn section(&self, question_type: QuestionType) -> &SectionConfig {
        match question_type {
            QuestionType::MultipleChoice => &self.multiple_choice,
            QuestionType::TrueFalseSet => &self.true_false,
            QuestionType::ShortAnswer => &self.short_answer,
        }
    }

    pub fn section_mut(&mut self, question_type: QuestionType) -> &mut SectionConfig {
        match question_type {
            QuestionType::MultipleChoice => &mut self.multiple_choice,
            QuestionType::TrueFalseSet => &mut self.true_false,
            QuestionType::ShortAnswer => &mut self.short_answer,
        }
    }

    pub fn total_count(&self) -> u32 {
        QuestionType::ALL
            .iter()
            .map(|&t| self.section(t).count)
            .sum()
    }

    pub fn total_points(&self) -> f64 {
        QuestionType::ALL
            .iter()
            .map(|&t| self.section(t).points)
            .sum()
    }
}
