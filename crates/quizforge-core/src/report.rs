//! Exam papers and results with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generator::PracticeSelection;
use crate::model::{ExamConfig, QuestionRecord, QuestionType};
use crate::scoring::ScoreBreakdown;

/// How a paper was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PaperSource {
    /// Drawn from a matrix, either a local file or one fetched by exam code.
    Matrix {
        #[serde(default)]
        exam_code: Option<String>,
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Free practice over a grade and topic selection.
    Practice {
        selection: PracticeSelection,
        #[serde(default)]
        seed: Option<u64>,
    },
}

/// A generated question set, handed to whatever renders the exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamPaper {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub source: PaperSource,
    pub config: ExamConfig,
    pub questions: Vec<QuestionRecord>,
}

impl ExamPaper {
    pub fn new(source: PaperSource, config: ExamConfig, questions: Vec<QuestionRecord>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source,
            config,
            questions,
        }
    }

    /// Number of questions of one type on the paper.
    pub fn count_of(&self, question_type: QuestionType) -> usize {
        self.questions
            .iter()
            .filter(|q| q.question_type() == question_type)
            .count()
    }

    /// Save the paper as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_json(self, path, "paper")
    }

    /// Load a paper from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        load_json(path, "paper")
    }
}

/// The outcome of a finished attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub attempt_id: Uuid,
    #[serde(default)]
    pub paper_id: Option<Uuid>,
    pub student: String,
    pub score: f64,
    pub max_score: f64,
    pub answered: usize,
    pub question_count: usize,
    pub breakdown: ScoreBreakdown,
    pub violations: u32,
    pub elapsed_secs: u64,
    pub submitted_at: DateTime<Utc>,
}

impl ExamResult {
    /// Save the result as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_json(self, path, "result")
    }

    /// Load a result from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        load_json(path, "result")
    }

    /// Format the result as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**{}:** {:.2} / {:.2} ({} of {} answered, {} violation(s), {}m{:02}s)\n\n",
            self.student,
            self.score,
            self.max_score,
            self.answered,
            self.question_count,
            self.violations,
            self.elapsed_secs / 60,
            self.elapsed_secs % 60,
        ));

        md.push_str("| Section | Questions | Answered | Correct | Points |\n");
        md.push_str("|---------|-----------|----------|---------|--------|\n");
        for s in self.breakdown.sections.iter().filter(|s| s.questions > 0) {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {:.2} / {:.2} |\n",
                s.question_type.title(),
                s.questions,
                s.answered,
                s.correct,
                s.points,
                s.max_points
            ));
        }

        md
    }
}

fn save_json<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {what}"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {what} to {}", path.display()))?;
    Ok(())
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} from {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {what} JSON"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::Attempt;
    use crate::model::{QuestionKind, SectionConfig};
    use crate::scoring::Answer;

    fn paper() -> ExamPaper {
        let questions = vec![
            QuestionRecord {
                id: 1,
                class_tag: "12.4.1".parse().unwrap(),
                prompt: "Pick B".into(),
                kind: QuestionKind::MultipleChoice {
                    options: vec!["A".into(), "B".into()],
                    correct_option: "B".into(),
                },
            },
            QuestionRecord {
                id: 2,
                class_tag: "12.4.2".parse().unwrap(),
                prompt: "Say hi".into(),
                kind: QuestionKind::ShortAnswer {
                    correct_answer: "hi".into(),
                },
            },
        ];
        let config = ExamConfig {
            multiple_choice: SectionConfig {
                points: 5.0,
                count: 1,
            },
            short_answer: SectionConfig {
                points: 5.0,
                count: 1,
            },
            duration_secs: 300,
            ..Default::default()
        };
        ExamPaper::new(
            PaperSource::Matrix {
                exam_code: Some("MATH12".into()),
                seed: Some(7),
            },
            config,
            questions,
        )
    }

    #[test]
    fn paper_json_roundtrip() {
        let paper = paper();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("paper.json");

        paper.save_json(&path).unwrap();
        let loaded = ExamPaper::load_json(&path).unwrap();

        assert_eq!(loaded.id, paper.id);
        assert_eq!(loaded.questions, paper.questions);
        assert_eq!(loaded.source, paper.source);
        assert_eq!(loaded.count_of(QuestionType::ShortAnswer), 1);
    }

    #[test]
    fn result_markdown_lists_present_sections() {
        let paper = paper();
        let now = Utc::now();
        let mut attempt = Attempt::start("bo", &paper, now);
        attempt.answer(1, Answer::Choice(1));
        let result = attempt.finish(&paper.config, now + chrono::Duration::seconds(75));

        assert_eq!(result.paper_id, Some(paper.id));
        let md = result.to_markdown();
        assert!(md.contains("**bo:** 5.00 / 10.00"));
        assert!(md.contains("1m15s"));
        assert!(md.contains("Multiple choice"));
        assert!(!md.contains("True/false"));
    }

    #[test]
    fn load_missing_file_fails() {
        let err = ExamResult::load_json(Path::new("no_such_result.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read result"));
    }
}
