//! Attempt scoring.
//!
//! Each section's points are split evenly across the questions of that type
//! actually present in the exam (not the configured count), so a short or
//! empty section can neither divide by zero nor inflate the score.
//! True/false sets earn partial credit on a non-linear curve.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{ExamConfig, QuestionKind, QuestionRecord, QuestionType};

/// A submitted answer. Its shape depends on the question type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Index into a multiple-choice question's options.
    Choice(usize),
    /// Option text for multiple choice, or free text for short answer.
    Text(String),
    /// One verdict per statement of a true/false set; `None` is left blank.
    Statements(Vec<Option<bool>>),
    /// Any other JSON shape. Counted as answered and graded as incorrect.
    Unrecognized(serde_json::Value),
}

impl Answer {
    /// Whether the answer carries nothing to grade.
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Choice(_) => false,
            Answer::Text(text) => text.trim().is_empty(),
            Answer::Statements(verdicts) => verdicts.iter().all(Option::is_none),
            Answer::Unrecognized(_) => false,
        }
    }
}

/// Answers keyed by question id. A `null` entry counts as unanswered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(HashMap<u32, Option<Answer>>);

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question_id: u32, answer: Answer) {
        self.0.insert(question_id, Some(answer));
    }

    pub fn remove(&mut self, question_id: u32) -> Option<Answer> {
        self.0.remove(&question_id).flatten()
    }

    /// The answer for a question, if one was given and is not blank.
    pub fn get(&self, question_id: u32) -> Option<&Answer> {
        self.0
            .get(&question_id)
            .and_then(Option::as_ref)
            .filter(|a| !a.is_blank())
    }

    /// Number of non-blank answers.
    pub fn answered(&self) -> usize {
        self.0
            .values()
            .filter(|a| a.as_ref().is_some_and(|a| !a.is_blank()))
            .count()
    }
}

impl FromIterator<(u32, Answer)> for AnswerSheet {
    fn from_iter<I: IntoIterator<Item = (u32, Answer)>>(iter: I) -> Self {
        AnswerSheet(iter.into_iter().map(|(id, a)| (id, Some(a))).collect())
    }
}

/// Score earned in one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub question_type: QuestionType,
    /// Questions of this type in the exam.
    pub questions: usize,
    pub answered: usize,
    /// Questions answered fully correctly.
    pub correct: usize,
    pub points: f64,
    pub max_points: f64,
}

/// Per-section scores and the rounded total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sections: Vec<SectionScore>,
    /// Sum of all section points, rounded to two decimals.
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn section(&self, question_type: QuestionType) -> Option<&SectionScore> {
        self.sections.iter().find(|s| s.question_type == question_type)
    }

    /// Highest score reachable with the sections actually present.
    pub fn max_total(&self) -> f64 {
        round2(self.sections.iter().map(|s| s.max_points).sum())
    }
}

/// Score an attempt. Pure; missing or malformed answers simply earn nothing.
pub fn score(questions: &[QuestionRecord], answers: &AnswerSheet, config: &ExamConfig) -> f64 {
    score_breakdown(questions, answers, config).total
}

/// Score an attempt and keep the per-section detail.
pub fn score_breakdown(
    questions: &[QuestionRecord],
    answers: &AnswerSheet,
    config: &ExamConfig,
) -> ScoreBreakdown {
    let mut sections = Vec::with_capacity(QuestionType::ALL.len());
    let mut total = 0.0;

    for question_type in QuestionType::ALL {
        let in_section: Vec<&QuestionRecord> = questions
            .iter()
            .filter(|q| q.question_type() == question_type)
            .collect();

        let mut section = SectionScore {
            question_type,
            questions: in_section.len(),
            answered: 0,
            correct: 0,
            points: 0.0,
            max_points: 0.0,
        };

        if !in_section.is_empty() {
            section.max_points = config.section(question_type).points;
            let base = section.max_points / in_section.len() as f64;

            for question in in_section {
                let Some(answer) = answers.get(question.id) else {
                    continue;
                };
                section.answered += 1;
                let credit = credit(question, answer);
                if credit >= 1.0 {
                    section.correct += 1;
                }
                section.points += base * credit;
            }
        }

        total += section.points;
        sections.push(section);
    }

    ScoreBreakdown {
        sections,
        total: round2(total),
    }
}

/// Fraction of a question's share earned by an answer, in `0.0..=1.0`.
pub fn credit(question: &QuestionRecord, answer: &Answer) -> f64 {
    let correct = match (&question.kind, answer) {
        (
            QuestionKind::MultipleChoice {
                options,
                correct_option,
            },
            Answer::Choice(index),
        ) => options.get(*index) == Some(correct_option),
        (QuestionKind::MultipleChoice { correct_option, .. }, Answer::Text(text)) => {
            text.trim() == correct_option.trim()
        }
        (QuestionKind::ShortAnswer { correct_answer }, Answer::Text(text)) => {
            normalize(text) == normalize(correct_answer)
        }
        // Numeric replies may arrive as bare JSON numbers.
        (QuestionKind::ShortAnswer { correct_answer }, Answer::Choice(n)) => {
            n.to_string() == normalize(correct_answer)
        }
        (QuestionKind::TrueFalseSet { statements }, Answer::Statements(verdicts)) => {
            let matching = statements
                .iter()
                .zip(verdicts)
                .filter(|(s, v)| **v == Some(s.is_true))
                .count();
            return true_false_credit(matching, statements.len());
        }
        _ => false,
    };

    if correct {
        1.0
    } else {
        0.0
    }
}

/// Partial credit for a true/false set with `correct` of `total` statements right.
///
/// Full marks need every statement. Otherwise credit depends on how many were
/// missed: one miss earns 0.50, two 0.25, three or more 0.10. Zero correct
/// earns nothing. For four statements this gives 0 / 0.10 / 0.25 / 0.50 / 1.00.
pub fn true_false_credit(correct: usize, total: usize) -> f64 {
    if total == 0 || correct == 0 {
        return 0.0;
    }
    match total.saturating_sub(correct) {
        0 => 1.0,
        1 => 0.5,
        2 => 0.25,
        _ => 0.1,
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Round half up to two decimals.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SectionConfig, Statement};

    fn mc(id: u32) -> QuestionRecord {
        QuestionRecord {
            id,
            class_tag: "12.4.1".parse().unwrap(),
            prompt: String::new(),
            kind: QuestionKind::MultipleChoice {
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_option: "C".into(),
            },
        }
    }

    fn tf(id: u32) -> QuestionRecord {
        let truth = [true, false, true, false];
        QuestionRecord {
            id,
            class_tag: "12.4.2".parse().unwrap(),
            prompt: String::new(),
            kind: QuestionKind::TrueFalseSet {
                statements: truth
                    .iter()
                    .enumerate()
                    .map(|(i, &is_true)| Statement {
                        text: format!("s{i}"),
                        is_true,
                    })
                    .collect(),
            },
        }
    }

    fn sa(id: u32, answer: &str) -> QuestionRecord {
        QuestionRecord {
            id,
            class_tag: "12.4.1".parse().unwrap(),
            prompt: String::new(),
            kind: QuestionKind::ShortAnswer {
                correct_answer: answer.into(),
            },
        }
    }

    fn config(mc: f64, tf: f64, sa: f64) -> ExamConfig {
        ExamConfig {
            multiple_choice: SectionConfig { points: mc, count: 0 },
            true_false: SectionConfig { points: tf, count: 0 },
            short_answer: SectionConfig { points: sa, count: 0 },
            duration_secs: 0,
        }
    }

    #[test]
    fn one_of_two_multiple_choice_correct() {
        let questions = vec![mc(1), mc(2)];
        let answers: AnswerSheet = [(1, Answer::Choice(2))].into_iter().collect();
        assert_eq!(score(&questions, &answers, &config(4.0, 0.0, 0.0)), 2.0);
    }

    #[test]
    fn multiple_choice_by_option_text() {
        let questions = vec![mc(1)];
        let answers: AnswerSheet = [(1, Answer::Text(" C ".into()))].into_iter().collect();
        assert_eq!(score(&questions, &answers, &config(3.0, 0.0, 0.0)), 3.0);

        let wrong: AnswerSheet = [(1, Answer::Choice(9))].into_iter().collect();
        assert_eq!(score(&questions, &wrong, &config(3.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn true_false_partial_credit_curve() {
        let expected = [0.0, 0.10, 0.25, 0.50, 1.00];
        for (correct, want) in expected.iter().enumerate() {
            assert_eq!(true_false_credit(correct, 4), *want, "correct = {correct}");
        }
    }

    #[test]
    fn true_false_three_of_four() {
        let questions = vec![tf(1)];
        let answers: AnswerSheet = [(
            1,
            Answer::Statements(vec![Some(true), Some(false), Some(true), Some(true)]),
        )]
        .into_iter()
        .collect();
        assert_eq!(score(&questions, &answers, &config(0.0, 2.0, 0.0)), 1.0);
    }

    #[test]
    fn true_false_blank_positions_do_not_match() {
        let questions = vec![tf(1)];
        let answers: AnswerSheet = [(1, Answer::Statements(vec![Some(true), None]))]
            .into_iter()
            .collect();
        // One of four right.
        assert_eq!(score(&questions, &answers, &config(0.0, 1.0, 0.0)), 0.1);
    }

    #[test]
    fn true_false_other_set_sizes() {
        assert_eq!(true_false_credit(2, 2), 1.0);
        assert_eq!(true_false_credit(1, 2), 0.5);
        assert_eq!(true_false_credit(0, 2), 0.0);
        assert_eq!(true_false_credit(3, 6), 0.1);
        assert_eq!(true_false_credit(0, 0), 0.0);
    }

    #[test]
    fn short_answer_ignores_case_and_padding() {
        let questions = vec![sa(1, "Paris"), sa(2, "42")];
        let answers: AnswerSheet = [(1, Answer::Text("  pARIS ".into())), (2, Answer::Choice(42))]
            .into_iter()
            .collect();
        assert_eq!(score(&questions, &answers, &config(0.0, 0.0, 3.0)), 3.0);
    }

    #[test]
    fn empty_sections_contribute_nothing() {
        let questions = vec![sa(1, "x")];
        let answers: AnswerSheet = [(1, Answer::Text("x".into()))].into_iter().collect();
        let breakdown = score_breakdown(&questions, &answers, &config(10.0, 10.0, 2.0));
        assert_eq!(breakdown.total, 2.0);
        assert_eq!(breakdown.section(QuestionType::MultipleChoice).unwrap().points, 0.0);
        assert_eq!(breakdown.max_total(), 2.0);

        assert_eq!(score(&[], &AnswerSheet::new(), &config(5.0, 5.0, 5.0)), 0.0);
    }

    #[test]
    fn blank_and_mismatched_answers_are_unanswered_or_wrong() {
        let questions = vec![sa(1, "x"), mc(2), tf(3)];
        let json = r#"{"1": "   ", "2": null, "3": "true"}"#;
        let answers: AnswerSheet = serde_json::from_str(json).unwrap();
        let breakdown = score_breakdown(&questions, &answers, &config(1.0, 1.0, 1.0));
        assert_eq!(breakdown.total, 0.0);
        assert_eq!(breakdown.section(QuestionType::ShortAnswer).unwrap().answered, 0);
        assert_eq!(breakdown.section(QuestionType::MultipleChoice).unwrap().answered, 0);
        // Text given for a true/false set is graded, and earns nothing.
        assert_eq!(breakdown.section(QuestionType::TrueFalseSet).unwrap().answered, 1);
        assert_eq!(answers.answered(), 1);
    }

    #[test]
    fn unrecognized_answer_shapes_score_zero() {
        let questions = vec![mc(1), mc(2), tf(3), sa(4, "y")];
        let json = r#"{"1": "C", "2": -1, "3": [true, "no", 2.0], "4": 2.5}"#;
        let answers: AnswerSheet = serde_json::from_str(json).unwrap();
        assert!(matches!(answers.get(2), Some(Answer::Unrecognized(_))));
        assert!(matches!(answers.get(3), Some(Answer::Unrecognized(_))));

        let breakdown = score_breakdown(&questions, &answers, &config(4.0, 1.0, 1.0));
        // Only question 1 earns its half of the multiple-choice points.
        assert_eq!(breakdown.total, 2.0);
        assert_eq!(breakdown.section(QuestionType::MultipleChoice).unwrap().answered, 2);
        assert_eq!(answers.answered(), 4);

        for bad in [r#"true"#, r#"{"pick": 1}"#] {
            let answer: Answer = serde_json::from_str(bad).unwrap();
            assert_eq!(credit(&mc(5), &answer), 0.0);
        }
    }

    #[test]
    fn total_is_rounded_to_two_decimals() {
        let questions = vec![mc(1), mc(2), mc(3)];
        let answers: AnswerSheet = [(1, Answer::Choice(2))].into_iter().collect();
        assert_eq!(score(&questions, &answers, &config(1.0, 0.0, 0.0)), 0.33);
    }

    #[test]
    fn scoring_is_repeatable() {
        let questions = vec![mc(1), tf(2), sa(3, "y")];
        let answers: AnswerSheet = [
            (1, Answer::Choice(2)),
            (2, Answer::Statements(vec![Some(true), Some(false), None, None])),
            (3, Answer::Text("Y".into())),
        ]
        .into_iter()
        .collect();
        let cfg = config(4.0, 3.0, 3.0);
        let first = score_breakdown(&questions, &answers, &cfg);
        let second = score_breakdown(&questions, &answers, &cfg);
        assert_eq!(first, second);
        // 4 + 3 * 0.25 + 3
        assert_eq!(first.total, 7.75);
        assert_eq!(first.section(QuestionType::TrueFalseSet).unwrap().correct, 0);
    }
}
