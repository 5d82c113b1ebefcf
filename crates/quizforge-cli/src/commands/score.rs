//! The `quizforge score` command.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quizforge_core::attempt::Attempt;
use quizforge_core::report::{ExamPaper, ExamResult, PaperSource};
use quizforge_core::scoring::Answer;
use quizforge_remote::config::{create_service, load_config_from};

pub struct ScoreArgs {
    pub paper: PathBuf,
    pub answers: PathBuf,
    pub student: String,
    pub violations: u32,
    pub elapsed: u64,
    pub submit: bool,
    pub exam: Option<String>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: ScoreArgs) -> Result<()> {
    let paper = ExamPaper::load_json(&args.paper)?;
    let answers = load_answers(&args.answers)?;

    let submitted_at = chrono::Utc::now();
    let started_at = i64::try_from(args.elapsed)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|elapsed| submitted_at.checked_sub_signed(elapsed))
        .with_context(|| format!("--elapsed {} is out of range", args.elapsed))?;

    let mut attempt = Attempt::start(args.student, &paper, started_at);
    for (id, answer) in answers {
        if !attempt.answer(id, answer) {
            eprintln!("Warning: question {id} is not on this paper, ignoring its answer.");
        }
    }
    for _ in 0..args.violations {
        attempt.record_violation();
    }

    let result = attempt.finish(&paper.config, submitted_at);

    match args.format.as_str() {
        "markdown" | "md" => println!("{}", result.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_summary(&result),
    }

    if let Some(output) = &args.output {
        result.save_json(output)?;
        eprintln!("Result saved to: {}", output.display());
    }

    if args.submit {
        let exam_code = args
            .exam
            .or_else(|| match &paper.source {
                PaperSource::Matrix { exam_code, .. } => exam_code.clone(),
                PaperSource::Practice { .. } => None,
            })
            .context("no exam code to submit under (pass --exam)")?;

        let config = load_config_from(args.config.as_deref())?;
        let service = create_service(&config)?;
        service
            .submit_result(&exam_code, &result)
            .await
            .with_context(|| format!("failed to submit result for exam {exam_code}"))?;
        eprintln!("Result submitted to {} for {exam_code}", service.name());
    }

    Ok(())
}

/// Answers are a JSON object keyed by question id. Null entries are unanswered.
fn load_answers(path: &Path) -> Result<BTreeMap<u32, Answer>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers from {}", path.display()))?;
    let raw: BTreeMap<u32, Option<Answer>> =
        serde_json::from_str(&content).context("failed to parse answers JSON")?;
    Ok(raw
        .into_iter()
        .filter_map(|(id, answer)| answer.map(|a| (id, a)))
        .collect())
}

fn print_summary(result: &ExamResult) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Section", "Questions", "Answered", "Correct", "Points"]);
    for s in result.breakdown.sections.iter().filter(|s| s.questions > 0) {
        table.add_row(vec![
            Cell::new(s.question_type.title()),
            Cell::new(s.questions),
            Cell::new(s.answered),
            Cell::new(s.correct),
            Cell::new(format!("{:.2} / {:.2}", s.points, s.max_points)),
        ]);
    }

    println!("{table}");
    println!(
        "{}: {:.2} / {:.2} ({} of {} answered, {} violation(s))",
        result.student,
        result.score,
        result.max_score,
        result.answered,
        result.question_count,
        result.violations
    );
}
