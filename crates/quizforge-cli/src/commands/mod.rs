pub mod generate;
pub mod init;
pub mod practice;
pub mod score;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use quizforge_core::bank::{load_bank_path, QuestionBank};
use quizforge_core::model::QuestionType;
use quizforge_core::report::ExamPaper;
use quizforge_remote::QuizforgeConfig;

/// Load the bank named on the command line, falling back to the config.
fn load_bank(bank: Option<PathBuf>, config: &QuizforgeConfig) -> Result<QuestionBank> {
    let path = bank
        .or_else(|| config.bank.clone())
        .context("no question bank given (pass --bank or set `bank` in quizforge.toml)")?;
    let bank = load_bank_path(&path)?;

    for w in bank.warnings() {
        let prefix = w
            .question_id
            .map(|id| format!("[{id}] "))
            .unwrap_or_default();
        eprintln!("Warning: {prefix}{}", w.message);
    }
    Ok(bank)
}

/// Seeded when a seed is given, otherwise from OS entropy.
fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn default_output(config: &QuizforgeConfig, kind: &str) -> PathBuf {
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    config.output_dir.join(format!("{kind}-{timestamp}.json"))
}

/// Print the per-section table of a paper and save it.
fn finish_paper(paper: &ExamPaper, requested: u32, output: &Path) -> Result<()> {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Section", "Requested", "Selected", "Points"]);
    for question_type in QuestionType::ALL {
        let section = paper.config.section(question_type);
        table.add_row(vec![
            Cell::new(question_type.title()),
            Cell::new(section.count),
            Cell::new(paper.count_of(question_type)),
            Cell::new(format!("{:.2}", section.points)),
        ]);
    }
    eprintln!("{table}");

    let selected = paper.questions.len();
    if selected == 0 {
        eprintln!("Warning: no questions matched; the paper is empty.");
    } else if (selected as u32) < requested {
        eprintln!("Warning: only {selected} of {requested} requested questions were available.");
    }

    paper.save_json(output)?;
    println!("Paper saved to: {}", output.display());
    Ok(())
}
