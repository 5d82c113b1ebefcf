//! The `quizforge generate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizforge_core::generator::ExamGenerator;
use quizforge_core::matrix::{load_matrix_spec, parse_matrix};
use quizforge_core::report::{ExamPaper, PaperSource};
use quizforge_remote::config::{create_service, load_config_from};
use quizforge_remote::CheckIn;

pub async fn execute(
    bank_path: Option<PathBuf>,
    matrix_path: Option<PathBuf>,
    exam_code: Option<String>,
    student: Option<String>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank = super::load_bank(bank_path, &config)?;

    let spec = match (&matrix_path, &exam_code) {
        (Some(path), _) => load_matrix_spec(path)?,
        (None, Some(code)) => {
            let service = create_service(&config)?;
            eprintln!("Fetching matrix for {code} from {}", service.name());
            let spec = service
                .fetch_matrix(code)
                .await
                .with_context(|| format!("failed to fetch matrix for exam {code}"))?;

            if let Some(student) = &student {
                let check_in = CheckIn {
                    student: student.clone(),
                    class_name: None,
                    exam_code: code.clone(),
                    started_at: chrono::Utc::now(),
                };
                service.check_in(&check_in).await.context("check-in failed")?;
                eprintln!("Checked in {student}");
            }
            spec
        }
        (None, None) => anyhow::bail!("either --matrix or --exam is required"),
    };

    let matrix = parse_matrix(&spec).context("invalid matrix")?;
    if matrix.is_empty() {
        eprintln!("Warning: the matrix contains no selection rules.");
    }

    let mut rng = super::make_rng(seed);
    let questions = ExamGenerator::new(&bank).generate(&matrix, &mut rng);

    let source = PaperSource::Matrix {
        exam_code: exam_code.clone(),
        seed,
    };
    let paper = ExamPaper::new(source, matrix.exam_config(), questions);
    tracing::info!(paper = %paper.id, questions = paper.questions.len(), "generated paper");

    eprintln!(
        "Bank: {} ({} questions), {} rule(s), {} tier override(s)",
        bank.name(),
        bank.len(),
        matrix.rules.len(),
        matrix.overrides.len()
    );

    let output = output.unwrap_or_else(|| super::default_output(&config, "paper"));
    super::finish_paper(&paper, matrix.requested(), &output)
}
