//! A student's attempt at an exam.
//!
//! All exam progress lives in this value: the question sequence, the answer
//! sheet, the clock and the violation count. The rendering layer owns it and
//! hands it back for scoring; nothing in this crate keeps attempts around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ExamConfig, QuestionRecord};
use crate::report::{ExamPaper, ExamResult};
use crate::scoring::{score_breakdown, Answer, AnswerSheet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    /// Paper the questions came from, when known.
    #[serde(default)]
    pub paper_id: Option<Uuid>,
    pub student: String,
    pub started_at: DateTime<Utc>,
    pub questions: Vec<QuestionRecord>,
    #[serde(default)]
    pub answers: AnswerSheet,
    /// Time allowed; zero means untimed.
    pub duration_secs: u64,
    /// Focus-loss and similar signals reported by the UI.
    #[serde(default)]
    pub violations: u32,
}

impl Attempt {
    pub fn new(
        student: impl Into<String>,
        questions: Vec<QuestionRecord>,
        duration_secs: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            paper_id: None,
            student: student.into(),
            started_at: now,
            questions,
            answers: AnswerSheet::new(),
            duration_secs,
            violations: 0,
        }
    }

    /// Start an attempt on a generated paper.
    pub fn start(student: impl Into<String>, paper: &ExamPaper, now: DateTime<Utc>) -> Self {
        let mut attempt = Self::new(
            student,
            paper.questions.clone(),
            paper.config.duration_secs,
            now,
        );
        attempt.paper_id = Some(paper.id);
        attempt
    }

    /// Record an answer. Returns `false` if the question is not part of this attempt.
    pub fn answer(&mut self, question_id: u32, answer: Answer) -> bool {
        if !self.questions.iter().any(|q| q.id == question_id) {
            return false;
        }
        self.answers.insert(question_id, answer);
        true
    }

    pub fn clear_answer(&mut self, question_id: u32) -> Option<Answer> {
        self.answers.remove(question_id)
    }

    /// Count one more violation and return the new total.
    pub fn record_violation(&mut self) -> u32 {
        self.violations += 1;
        self.violations
    }

    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.answers.get(q.id).is_some())
            .count()
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_seconds().max(0) as u64
    }

    /// Seconds left on the clock, `None` when untimed.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<u64> {
        if self.duration_secs == 0 {
            return None;
        }
        Some(self.duration_secs.saturating_sub(self.elapsed_secs(now)))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) == Some(0)
    }

    /// Score the attempt and produce the result record.
    pub fn finish(&self, config: &ExamConfig, now: DateTime<Utc>) -> ExamResult {
        let breakdown = score_breakdown(&self.questions, &self.answers, config);
        let mut elapsed_secs = self.elapsed_secs(now);
        if self.duration_secs > 0 {
            elapsed_secs = elapsed_secs.min(self.duration_secs);
        }

        tracing::info!(
            attempt = %self.id,
            student = %self.student,
            score = breakdown.total,
            violations = self.violations,
            "attempt finished"
        );

        ExamResult {
            attempt_id: self.id,
            paper_id: self.paper_id,
            student: self.student.clone(),
            score: breakdown.total,
            max_score: breakdown.max_total(),
            answered: self.answered_count(),
            question_count: self.questions.len(),
            breakdown,
            violations: self.violations,
            elapsed_secs,
            submitted_at: now,
        }
    }
}
