//! The `quizforge practice` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::generator::{ExamGenerator, PracticeSelection};
use quizforge_core::model::ExamConfig;
use quizforge_core::report::{ExamPaper, PaperSource};
use quizforge_remote::config::load_config_from;

pub struct PracticeArgs {
    pub bank: Option<PathBuf>,
    pub grade: u32,
    pub topics: String,
    /// Multiple choice, true/false, short answer.
    pub counts: [u32; 3],
    pub points: [f64; 3],
    pub minutes: u32,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn execute(args: PracticeArgs) -> Result<()> {
    anyhow::ensure!(
        args.points.iter().all(|p| p.is_finite() && *p >= 0.0),
        "section points must be non-negative"
    );

    let topics = args
        .topics
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("invalid topic: '{}'", s.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    anyhow::ensure!(!topics.is_empty(), "at least one topic is required");

    let exam_config = ExamConfig::practice(args.counts, args.points, args.minutes);
    let total = exam_config.total_count();
    anyhow::ensure!(total > 0, "at least one of --mc, --tf, --sa must be non-zero");

    let config = load_config_from(args.config.as_deref())?;
    let bank = super::load_bank(args.bank, &config)?;

    let selection = PracticeSelection {
        grade: args.grade,
        topics,
    };
    let mut rng = super::make_rng(args.seed);
    let questions = ExamGenerator::new(&bank).practice(&selection, total as usize, &mut rng);

    let source = PaperSource::Practice {
        selection,
        seed: args.seed,
    };
    let paper = ExamPaper::new(source, exam_config, questions);

    let output = args
        .output
        .unwrap_or_else(|| super::default_output(&config, "practice"));
    super::finish_paper(&paper, total, &output)
}
