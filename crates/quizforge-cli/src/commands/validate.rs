//! The `quizforge validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizforge_core::bank::load_bank_path;
use quizforge_core::matrix::{load_matrix_spec, parse_matrix};

pub fn execute(bank_path: PathBuf, matrix_path: Option<PathBuf>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let bank = load_bank_path(&bank_path)?;
    println!("Bank: {} ({} questions)", bank.name(), bank.len());

    for w in bank.warnings() {
        let prefix = w
            .question_id
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    let mut table = Table::new();
    table.set_header(vec!["Type", "Grade", "Topic", "Tier", "Questions"]);
    for ((question_type, grade, topic, tier), count) in bank.inventory() {
        table.add_row(vec![
            Cell::new(question_type.title()),
            Cell::new(grade),
            Cell::new(topic),
            Cell::new(tier),
            Cell::new(count),
        ]);
    }
    println!("{table}");

    let mut shortfalls = 0;
    if let Some(path) = matrix_path {
        let spec = load_matrix_spec(&path)?;
        let matrix =
            parse_matrix(&spec).with_context(|| format!("invalid matrix: {}", path.display()))?;
        println!(
            "Matrix: {} rule(s), {} question(s) requested",
            matrix.rules.len(),
            matrix.requested()
        );

        for rule in &matrix.rules {
            let available = bank
                .candidates(rule.question_type, rule.grade, rule.topic)
                .len();
            if available < rule.count as usize {
                println!(
                    "  [{rule}] WARNING: {} requested, {available} available",
                    rule.count
                );
                shortfalls += 1;
            }
        }
    }

    let total_warnings = bank.warnings().len() + shortfalls;
    if total_warnings == 0 {
        println!("All questions valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
