//! Exam generator.
//!
//! Draws a concrete question sequence from the bank according to parsed
//! selection rules. Every draw is a Fisher–Yates shuffle of the candidate
//! pool followed by taking a prefix, and the random source is passed in by
//! the caller so generation is reproducible under a fixed seed.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bank::QuestionBank;
use crate::matrix::ParsedMatrix;
use crate::model::{QuestionRecord, QuestionType, SelectionRule, TierOverride};

/// Tiers that can carry a dedicated sub-quota, in the order they are drawn.
const QUOTA_TIERS: [u8; 2] = [4, 3];

type QuotaKey = (QuestionType, u32, u32, u8);

/// Generates matrix-driven exams from a question bank.
pub struct ExamGenerator<'a> {
    bank: &'a QuestionBank,
}

impl<'a> ExamGenerator<'a> {
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self { bank }
    }

    /// Generate the question sequence for a parsed matrix.
    pub fn generate<R: Rng + ?Sized>(&self, matrix: &ParsedMatrix, rng: &mut R) -> Vec<QuestionRecord> {
        generate(&matrix.rules, &matrix.overrides, self.bank, rng)
    }

    /// Generate a free-practice exam with no type quotas.
    pub fn practice<R: Rng + ?Sized>(
        &self,
        selection: &PracticeSelection,
        total: usize,
        rng: &mut R,
    ) -> Vec<QuestionRecord> {
        generate_practice(self.bank, selection, total, rng)
    }
}

/// Draw questions for every rule.
///
/// Output is grouped by section (multiple choice, true/false, short answer)
/// and, within a section, follows rule order. Each rule contributes its
/// tier-4 picks, then its tier-3 picks, then the remainder. No question is
/// drawn twice, and a rule whose pool is too small simply yields fewer
/// questions.
pub fn generate<R: Rng + ?Sized>(
    rules: &[SelectionRule],
    overrides: &[TierOverride],
    bank: &QuestionBank,
    rng: &mut R,
) -> Vec<QuestionRecord> {
    let mut quotas: HashMap<QuotaKey, u32> = HashMap::new();
    for o in overrides {
        *quotas
            .entry((o.question_type, o.grade, o.topic, o.tier))
            .or_insert(0) += o.count;
    }

    let mut used: HashSet<u32> = HashSet::new();
    let mut exam = Vec::new();

    for section in QuestionType::ALL {
        for rule in rules.iter().filter(|r| r.question_type == section) {
            let picks = select_for_rule(rule, bank, &mut quotas, &used, rng);
            if picks.len() < rule.count as usize {
                tracing::warn!(
                    rule = %rule,
                    requested = rule.count,
                    selected = picks.len(),
                    "not enough questions in the bank for rule"
                );
            }
            for q in picks {
                used.insert(q.id);
                exam.push(q.clone());
            }
        }
    }

    exam
}

fn select_for_rule<'b, R: Rng + ?Sized>(
    rule: &SelectionRule,
    bank: &'b QuestionBank,
    quotas: &mut HashMap<QuotaKey, u32>,
    used: &HashSet<u32>,
    rng: &mut R,
) -> Vec<&'b QuestionRecord> {
    let candidates: Vec<&QuestionRecord> = bank
        .candidates(rule.question_type, rule.grade, rule.topic)
        .into_iter()
        .filter(|q| !used.contains(&q.id))
        .collect();

    let mut picked: Vec<&QuestionRecord> = Vec::new();
    let mut picked_ids: HashSet<u32> = HashSet::new();
    let mut budget = rule.count as usize;

    // A shortfall in one tier is not carried over to the next tier's draw.
    for tier in QUOTA_TIERS {
        let quota = quotas
            .get_mut(&(rule.question_type, rule.grade, rule.topic, tier))
            .map(|q| {
                let wanted = (*q as usize).min(budget);
                (q, wanted)
            });
        let Some((remaining_quota, wanted)) = quota else {
            continue;
        };
        if wanted == 0 {
            continue;
        }

        let pool: Vec<&QuestionRecord> = candidates
            .iter()
            .copied()
            .filter(|q| q.tier() == tier && !picked_ids.contains(&q.id))
            .collect();
        let chosen = take_random(pool, wanted, rng);

        *remaining_quota -= chosen.len() as u32;
        budget -= chosen.len();
        tracing::debug!(rule = %rule, tier, wanted, chosen = chosen.len(), "tier draw");

        picked_ids.extend(chosen.iter().map(|q| q.id));
        picked.extend(chosen);
    }

    let rest: Vec<&QuestionRecord> = candidates
        .into_iter()
        .filter(|q| !picked_ids.contains(&q.id))
        .collect();
    picked.extend(take_random(rest, budget, rng));

    picked
}

/// Uniform sample without replacement: shuffle, then keep a prefix.
fn take_random<T, R: Rng + ?Sized>(mut pool: Vec<T>, n: usize, rng: &mut R) -> Vec<T> {
    pool.shuffle(rng);
    pool.truncate(n);
    pool
}

/// Grade and topic filter for a free-practice exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSelection {
    pub grade: u32,
    pub topics: Vec<u32>,
}

/// Draw `total` questions of any type from the selected grade and topics.
pub fn generate_practice<R: Rng + ?Sized>(
    bank: &QuestionBank,
    selection: &PracticeSelection,
    total: usize,
    rng: &mut R,
) -> Vec<QuestionRecord> {
    let pool = bank.by_grade_topics(selection.grade, &selection.topics);
    if pool.len() < total {
        tracing::warn!(
            grade = selection.grade,
            requested = total,
            available = pool.len(),
            "practice pool is smaller than requested"
        );
    }
    take_random(pool, total, rng).into_iter().cloned().collect()
}
