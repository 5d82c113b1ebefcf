//! Question bank loading and validation.
//!
//! Banks are TOML or JSON files with a `[bank]` header and a `questions`
//! array. Records that lack the fields their type requires are excluded
//! from the bank and reported as warnings, so they can never be sampled.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{ClassTag, QuestionKind, QuestionRecord, QuestionType, Statement};

/// On-disk encoding of a bank file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Toml,
    Json,
}

impl BankFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(BankFormat::Toml),
            Some("json") => Some(BankFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawBankFile {
    #[serde(default)]
    bank: RawBankHeader,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBankHeader {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: u32,
    #[serde(default)]
    class: String,
    #[serde(rename = "type")]
    question_type: String,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    statements: Vec<RawStatement>,
}

#[derive(Debug, Deserialize)]
struct RawStatement {
    text: String,
    #[serde(alias = "correct")]
    is_true: bool,
}

impl RawQuestion {
    fn into_record(self) -> Result<QuestionRecord, String> {
        let class_tag: ClassTag = self.class.parse()?;
        let question_type: QuestionType = self.question_type.parse()?;

        let kind = match question_type {
            QuestionType::MultipleChoice => {
                let answer = self
                    .answer
                    .as_deref()
                    .map(str::trim)
                    .ok_or("multiple-choice question has no answer")?;
                let correct_option = self
                    .options
                    .iter()
                    .find(|o| o.trim() == answer)
                    .cloned()
                    .ok_or_else(|| format!("answer '{answer}' is not one of the options"))?;
                QuestionKind::MultipleChoice {
                    options: self.options,
                    correct_option,
                }
            }
            QuestionType::TrueFalseSet => QuestionKind::TrueFalseSet {
                statements: self
                    .statements
                    .into_iter()
                    .map(|s| Statement {
                        text: s.text,
                        is_true: s.is_true,
                    })
                    .collect(),
            },
            QuestionType::ShortAnswer => QuestionKind::ShortAnswer {
                correct_answer: self.answer.unwrap_or_default(),
            },
        };
        check_kind(&kind)?;

        Ok(QuestionRecord {
            id: self.id,
            class_tag,
            prompt: self.prompt,
            kind,
        })
    }
}

/// Check that a question carries the fields its type needs.
pub fn check_kind(kind: &QuestionKind) -> Result<(), String> {
    match kind {
        QuestionKind::MultipleChoice {
            options,
            correct_option,
        } => {
            if options.len() < 2 {
                return Err("multiple-choice question needs at least two options".into());
            }
            if !options.iter().any(|o| o.trim() == correct_option.trim()) {
                return Err(format!(
                    "answer '{}' is not one of the options",
                    correct_option.trim()
                ));
            }
        }
        QuestionKind::TrueFalseSet { statements } => {
            if statements.is_empty() {
                return Err("true-false-set question has no statements".into());
            }
        }
        QuestionKind::ShortAnswer { correct_answer } => {
            if correct_answer.trim().is_empty() {
                return Err("short-answer question has no answer".into());
            }
        }
    }
    Ok(())
}

/// A record that was left out of the bank, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankWarning {
    pub question_id: Option<u32>,
    pub message: String,
}

/// Key of the bank inventory: (type, grade, topic, tier).
pub type InventoryKey = (QuestionType, u32, u32, u8);

/// The read-only catalog of valid questions.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    name: String,
    records: Vec<QuestionRecord>,
    warnings: Vec<BankWarning>,
}

impl QuestionBank {
    /// Build a bank from already-typed records.
    ///
    /// Records missing the fields their type needs, and repeats of an id
    /// already seen, are left out with a warning each.
    pub fn new(name: impl Into<String>, records: Vec<QuestionRecord>) -> Self {
        let mut bank = QuestionBank {
            name: name.into(),
            ..Default::default()
        };
        let mut seen = HashSet::new();
        for record in records {
            match check_kind(&record.kind) {
                Ok(()) => bank.push_unique(record, &mut seen),
                Err(message) => bank.warnings.push(BankWarning {
                    question_id: Some(record.id),
                    message,
                }),
            }
        }
        bank
    }

    fn from_raw(name: String, raw: Vec<RawQuestion>) -> Self {
        let mut bank = QuestionBank {
            name,
            ..Default::default()
        };
        let mut seen = HashSet::new();
        for question in raw {
            let id = question.id;
            match question.into_record() {
                Ok(record) => bank.push_unique(record, &mut seen),
                Err(message) => bank.warnings.push(BankWarning {
                    question_id: Some(id),
                    message,
                }),
            }
        }
        bank
    }

    fn push_unique(&mut self, record: QuestionRecord, seen: &mut HashSet<u32>) {
        if seen.insert(record.id) {
            self.records.push(record);
        } else {
            self.warnings.push(BankWarning {
                question_id: Some(record.id),
                message: format!("duplicate question id {}", record.id),
            });
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    /// Records excluded while loading.
    pub fn warnings(&self) -> &[BankWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&QuestionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// All questions of one type in one grade and topic.
    pub fn candidates(
        &self,
        question_type: QuestionType,
        grade: u32,
        topic: u32,
    ) -> Vec<&QuestionRecord> {
        self.records
            .iter()
            .filter(|r| r.question_type() == question_type && r.class_tag.matches(grade, topic))
            .collect()
    }

    /// All questions of a grade whose topic is in `topics`, any type.
    pub fn by_grade_topics(&self, grade: u32, topics: &[u32]) -> Vec<&QuestionRecord> {
        self.records
            .iter()
            .filter(|r| r.class_tag.grade == grade && topics.contains(&r.class_tag.topic))
            .collect()
    }

    /// Count of questions per (type, grade, topic, tier).
    pub fn inventory(&self) -> BTreeMap<InventoryKey, usize> {
        let mut inventory = BTreeMap::new();
        for r in &self.records {
            let key = (
                r.question_type(),
                r.class_tag.grade,
                r.class_tag.topic,
                r.class_tag.tier,
            );
            *inventory.entry(key).or_insert(0) += 1;
        }
        inventory
    }
}

/// Load a single bank file, choosing the format from its extension.
pub fn load_bank(path: &Path) -> Result<QuestionBank> {
    let format = BankFormat::from_path(path)
        .with_context(|| format!("unsupported bank file extension: {}", path.display()))?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;
    load_bank_str(&content, format, path)
}

/// Parse bank content (useful for testing).
pub fn load_bank_str(content: &str, format: BankFormat, source_path: &Path) -> Result<QuestionBank> {
    let raw = parse_raw(content, format, source_path)?;
    let name = if raw.bank.name.is_empty() {
        file_stem(source_path)
    } else {
        raw.bank.name
    };
    Ok(QuestionBank::from_raw(name, raw.questions))
}

/// Recursively load every `.toml`/`.json` bank file under a directory into one bank.
///
/// Files that fail to parse are skipped with a warning; ids repeated across
/// files keep their first occurrence.
pub fn load_bank_directory(dir: &Path) -> Result<QuestionBank> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut questions = Vec::new();
    collect_raw(dir, &mut questions)?;
    Ok(QuestionBank::from_raw(file_stem(dir), questions))
}

/// Load a bank from a file or a directory.
pub fn load_bank_path(path: &Path) -> Result<QuestionBank> {
    if path.is_dir() {
        load_bank_directory(path)
    } else {
        load_bank(path)
    }
}

fn collect_raw(dir: &Path, questions: &mut Vec<RawQuestion>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    // Deterministic order so "first occurrence" means the same thing on every run.
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_raw(&path, questions)?;
            continue;
        }
        let Some(format) = BankFormat::from_path(&path) else {
            continue;
        };
        let parsed = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read bank file: {}", path.display()))
            .and_then(|content| parse_raw(&content, format, &path));
        match parsed {
            Ok(raw) => questions.extend(raw.questions),
            Err(e) => tracing::warn!("skipping {}: {:#}", path.display(), e),
        }
    }

    Ok(())
}

fn parse_raw(content: &str, format: BankFormat, source_path: &Path) -> Result<RawBankFile> {
    match format {
        BankFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse bank TOML: {}", source_path.display())),
        BankFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse bank JSON: {}", source_path.display())),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bank")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[bank]
name = "Grade 12 Mathematics"

[[questions]]
id = 1
class = "12.4.1"
type = "multiple-choice"
prompt = "What is $2 + 2$?"
options = ["3", "4", "5", "22"]
answer = "4"

[[questions]]
id = 2
class = "12.4.3"
type = "true-false-set"
prompt = "Decide for each statement."
statements = [
    { text = "1 is prime", is_true = false },
    { text = "2 is prime", is_true = true },
    { text = "9 is prime", is_true = false },
    { text = "11 is prime", is_true = true },
]

[[questions]]
id = 3
class = "12.5"
type = "short-answer"
prompt = "Compute 6 * 7."
answer = "42"
"#;

    fn parse(content: &str) -> QuestionBank {
        load_bank_str(content, BankFormat::Toml, &PathBuf::from("bank.toml")).unwrap()
    }

    #[test]
    fn parse_valid_bank() {
        let bank = parse(VALID_TOML);
        assert_eq!(bank.name(), "Grade 12 Mathematics");
        assert_eq!(bank.len(), 3);
        assert!(bank.warnings().is_empty());

        let tf = bank.get(2).unwrap();
        assert_eq!(tf.question_type(), QuestionType::TrueFalseSet);
        assert_eq!(tf.tier(), 3);
        assert_eq!(bank.get(3).unwrap().tier(), 1);
    }

    #[test]
    fn invalid_records_are_excluded() {
        let toml = r#"
[[questions]]
id = 1
class = "12.4.1"
type = "multiple-choice"
options = ["a", "b"]
answer = "c"

[[questions]]
id = 2
class = "12.4.1"
type = "true-false-set"

[[questions]]
id = 3
class = "12.4.1"
type = "short-answer"
answer = "   "

[[questions]]
id = 4
class = "twelve.4"
type = "short-answer"
answer = "x"

[[questions]]
id = 5
class = "12.4.2"
type = "essay"

[[questions]]
id = 6
class = "12.4.2"
type = "short-answer"
answer = "ok"
"#;
        let bank = parse(toml);
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.records()[0].id, 6);

        let ids: Vec<Option<u32>> = bank.warnings().iter().map(|w| w.question_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
        assert!(bank.warnings()[0].message.contains("not one of the options"));
    }

    #[test]
    fn typed_records_are_checked_like_loaded_ones() {
        let class: ClassTag = "12.4.4".parse().unwrap();
        let record = |id: u32, kind: QuestionKind| QuestionRecord {
            id,
            class_tag: class.clone(),
            prompt: String::new(),
            kind,
        };
        let records = vec![
            record(
                1,
                QuestionKind::MultipleChoice {
                    options: vec![],
                    correct_option: "Z".into(),
                },
            ),
            record(
                2,
                QuestionKind::MultipleChoice {
                    options: vec!["A".into(), "B".into()],
                    correct_option: "Z".into(),
                },
            ),
            record(3, QuestionKind::TrueFalseSet { statements: vec![] }),
            record(
                4,
                QuestionKind::ShortAnswer {
                    correct_answer: " ".into(),
                },
            ),
            record(
                5,
                QuestionKind::MultipleChoice {
                    options: vec!["A".into(), "B ".into()],
                    correct_option: "B".into(),
                },
            ),
        ];

        let bank = QuestionBank::new("typed", records);
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.records()[0].id, 5);

        let ids: Vec<Option<u32>> = bank.warnings().iter().map(|w| w.question_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(4)]);
        assert!(bank.warnings()[0].message.contains("at least two options"));
        assert!(bank.warnings()[1].message.contains("not one of the options"));
        assert!(bank.warnings()[2].message.contains("no statements"));

        // Only the valid record is ever a candidate.
        let candidates = bank.candidates(QuestionType::MultipleChoice, 12, 4);
        assert_eq!(candidates.len(), 1);
        assert!(bank.candidates(QuestionType::TrueFalseSet, 12, 4).is_empty());
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let toml = r#"
[[questions]]
id = 9
class = "10.1.1"
type = "short-answer"
answer = "first"

[[questions]]
id = 9
class = "10.1.1"
type = "short-answer"
answer = "second"
"#;
        let bank = parse(toml);
        assert_eq!(bank.len(), 1);
        assert!(matches!(
            &bank.records()[0].kind,
            QuestionKind::ShortAnswer { correct_answer } if correct_answer == "first"
        ));
        assert!(bank.warnings()[0].message.contains("duplicate"));
    }

    #[test]
    fn candidates_and_inventory() {
        let bank = parse(VALID_TOML);
        assert_eq!(bank.candidates(QuestionType::MultipleChoice, 12, 4).len(), 1);
        assert!(bank.candidates(QuestionType::MultipleChoice, 12, 5).is_empty());
        assert_eq!(bank.by_grade_topics(12, &[4, 5]).len(), 3);
        assert_eq!(bank.by_grade_topics(11, &[4]).len(), 0);

        let inventory = bank.inventory();
        assert_eq!(inventory.get(&(QuestionType::TrueFalseSet, 12, 4, 3)), Some(&1));
        assert_eq!(inventory.len(), 3);
    }

    #[test]
    fn json_bank() {
        let json = r#"{
            "bank": {"name": "json"},
            "questions": [
                {"id": 1, "class": "11.2.1", "type": "mc", "options": ["x", "y"], "answer": "y"}
            ]
        }"#;
        let bank = load_bank_str(json, BankFormat::Json, &PathBuf::from("bank.json")).unwrap();
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let result = load_bank_str("not [valid", BankFormat::Toml, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory_merges_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(
            dir.path().join("nested").join("b.json"),
            r#"{"questions": [{"id": 50, "class": "10.1.2", "type": "short-answer", "answer": "x"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.toml"), "{{{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let bank = load_bank_directory(dir.path()).unwrap();
        assert_eq!(bank.len(), 4);
        assert!(bank.get(50).is_some());
    }

    #[test]
    fn unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.yaml");
        std::fs::write(&path, "").unwrap();
        assert!(load_bank(&path).is_err());
    }
}
