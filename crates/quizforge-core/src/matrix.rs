//! Matrix parser.
//!
//! Turns the compact textual matrix description into selection rules.
//! A section field looks like `[6]; 12.4.5; 12.5.1.3`: an optional
//! bracketed total score, an optional `:`/`;` separator, then
//! `grade.topic[.tier].count` rules separated by `;`. The tier-3/tier-4
//! override fields hold entries such as `M12.4.2`, where the leading
//! character names the question type.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::MatrixError;
use crate::model::{ExamConfig, MatrixSpec, QuestionType, SelectionRule, TierOverride};

/// Rules and total score parsed from one section field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionRules {
    /// Total points for the section (0 when no bracket is given).
    pub points: f64,
    pub rules: Vec<SelectionRule>,
}

/// A fully parsed matrix, ready for the exam generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedMatrix {
    /// Rules in section order (multiple choice, true/false, short answer).
    pub rules: Vec<SelectionRule>,
    /// Tier-3 and tier-4 sub-quotas.
    pub overrides: Vec<TierOverride>,
    /// Total score declared for each section.
    pub section_points: BTreeMap<QuestionType, f64>,
    pub duration_secs: u64,
}

impl ParsedMatrix {
    /// Total number of questions requested across all rules.
    pub fn requested(&self) -> u32 {
        self.rules.iter().map(|r| r.count).sum()
    }

    /// Number of questions requested for one section.
    pub fn requested_for(&self, question_type: QuestionType) -> u32 {
        self.rules
            .iter()
            .filter(|r| r.question_type == question_type)
            .map(|r| r.count)
            .sum()
    }

    /// Sub-quota for a (type, grade, topic) at the given tier, summed across entries.
    pub fn tier_quota(&self, question_type: QuestionType, grade: u32, topic: u32, tier: u8) -> u32 {
        self.overrides
            .iter()
            .filter(|o| {
                o.question_type == question_type
                    && o.grade == grade
                    && o.topic == topic
                    && o.tier == tier
            })
            .map(|o| o.count)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Derive the scoring configuration of a matrix-driven exam.
    pub fn exam_config(&self) -> ExamConfig {
        let mut config = ExamConfig {
            duration_secs: self.duration_secs,
            ..ExamConfig::default()
        };
        for question_type in QuestionType::ALL {
            let section = config.section_mut(question_type);
            section.points = self
                .section_points
                .get(&question_type)
                .copied()
                .unwrap_or(0.0);
            section.count = self.requested_for(question_type);
        }
        config
    }
}

/// Parse every field of a matrix.
pub fn parse_matrix(spec: &MatrixSpec) -> Result<ParsedMatrix, MatrixError> {
    let mut parsed = ParsedMatrix::default();

    for question_type in QuestionType::ALL {
        let Some(field) = spec.section(question_type) else {
            continue;
        };
        let section = parse_section(field, question_type)?;
        parsed.section_points.insert(question_type, section.points);
        parsed.rules.extend(section.rules);
    }

    for (tier, field) in [(3u8, &spec.tier3), (4u8, &spec.tier4)] {
        if let Some(field) = field {
            parsed.overrides.extend(parse_overrides(field, tier)?);
        }
    }

    if !spec.duration_minutes.is_finite() || spec.duration_minutes < 0.0 {
        return Err(MatrixError::InvalidDuration(spec.duration_minutes));
    }
    parsed.duration_secs = (spec.duration_minutes * 60.0).round() as u64;

    tracing::debug!(
        rules = parsed.rules.len(),
        overrides = parsed.overrides.len(),
        requested = parsed.requested(),
        "parsed matrix"
    );

    Ok(parsed)
}

/// Parse one section field such as `"[6]; 12.4.5; 12.5.2"`.
pub fn parse_section(field: &str, question_type: QuestionType) -> Result<SectionRules, MatrixError> {
    let section = question_type.to_string();
    let (score, body) = split_score(field, &section)?;

    // A typo in the score is visible to whoever reads the matrix, so it is
    // not treated as fatal.
    let points = score
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(0.0);

    let mut rules = Vec::new();
    for fragment in body.split(';') {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        rules.push(parse_rule(fragment, question_type, &section)?);
    }

    Ok(SectionRules { points, rules })
}

/// Parse a tier-3 or tier-4 override field such as `"M12.4.2; T12.5.1"`.
pub fn parse_overrides(field: &str, tier: u8) -> Result<Vec<TierOverride>, MatrixError> {
    let section = format!("tier-{tier}");
    let (_, body) = split_score(field, &section)?;

    let mut overrides = Vec::new();
    for entry in body.split(';') {
        let entry = entry.trim();
        let mut chars = entry.chars();
        let Some(marker) = chars.next() else {
            continue;
        };
        let question_type =
            QuestionType::from_marker(marker).ok_or_else(|| MatrixError::UnknownTypeMarker {
                tier,
                entry: entry.to_string(),
                marker,
            })?;

        let rest = chars.as_str().trim();
        let [grade, topic, count] = parse_triple(rest).map_err(|reason| MatrixError::MalformedRule {
            section: section.clone(),
            rule: entry.to_string(),
            reason,
        })?;

        overrides.push(TierOverride {
            question_type,
            grade,
            topic,
            tier,
            count,
        });
    }

    Ok(overrides)
}

/// Load a matrix description from a TOML file.
pub fn load_matrix_spec(path: &Path) -> anyhow::Result<MatrixSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read matrix file: {}", path.display()))?;
    parse_matrix_spec_str(&content, path)
}

/// Parse a TOML matrix description (useful for testing).
pub fn parse_matrix_spec_str(content: &str, source_path: &Path) -> anyhow::Result<MatrixSpec> {
    toml::from_str(content)
        .with_context(|| format!("failed to parse matrix TOML: {}", source_path.display()))
}

/// Split an optional leading `[score]` and separator off a field.
fn split_score<'a>(field: &'a str, section: &str) -> Result<(Option<&'a str>, &'a str), MatrixError> {
    let trimmed = field.trim();

    let (score, rest) = match trimmed.strip_prefix('[') {
        Some(inner) => {
            let end = inner.find(']').ok_or_else(|| MatrixError::MalformedRule {
                section: section.to_string(),
                rule: trimmed.to_string(),
                reason: "unterminated score bracket".into(),
            })?;
            (Some(&inner[..end]), inner[end + 1..].trim_start())
        }
        None => (None, trimmed),
    };

    let rest = rest
        .strip_prefix(':')
        .or_else(|| rest.strip_prefix(';'))
        .unwrap_or(rest);

    Ok((score, rest))
}

fn parse_rule(
    fragment: &str,
    question_type: QuestionType,
    section: &str,
) -> Result<SelectionRule, MatrixError> {
    let malformed = |reason: String| MatrixError::MalformedRule {
        section: section.to_string(),
        rule: fragment.to_string(),
        reason,
    };

    let segments: Vec<&str> = fragment.split('.').map(str::trim).collect();
    let (grade, topic, tier, count) = match segments.as_slice() {
        [grade, topic, count] => (grade, topic, None, count),
        [grade, topic, tier, count] => (grade, topic, Some(tier), count),
        _ => {
            return Err(malformed(format!(
                "expected grade.topic.count or grade.topic.tier.count, found {} segment(s)",
                segments.len()
            )))
        }
    };

    let difficulty_tier = tier
        .map(|t| parse_segment::<u8>(t, "tier"))
        .transpose()
        .map_err(malformed)?;

    Ok(SelectionRule {
        question_type,
        grade: parse_segment(grade, "grade").map_err(malformed)?,
        topic: parse_segment(topic, "topic").map_err(malformed)?,
        count: parse_segment(count, "count").map_err(malformed)?,
        difficulty_tier,
    })
}

fn parse_triple(text: &str) -> Result<[u32; 3], String> {
    let segments: Vec<&str> = text.split('.').map(str::trim).collect();
    match segments.as_slice() {
        [grade, topic, count] => Ok([
            parse_segment(grade, "grade")?,
            parse_segment(topic, "topic")?,
            parse_segment(count, "count")?,
        ]),
        _ => Err(format!(
            "expected grade.topic.count, found {} segment(s)",
            segments.len()
        )),
    }
}

fn parse_segment<T: std::str::FromStr>(segment: &str, name: &str) -> Result<T, String> {
    segment
        .parse::<T>()
        .map_err(|_| format!("{name} '{segment}' is not a non-negative integer"))
}
