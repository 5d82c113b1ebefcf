//! quizforge CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizforge", version, about = "Matrix-driven exam generation and scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an exam paper from a matrix
    Generate {
        /// Question bank file or directory (defaults to `bank` in the config)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Matrix TOML file
        #[arg(long, conflicts_with = "exam", required_unless_present = "exam")]
        matrix: Option<PathBuf>,

        /// Exam code to fetch the matrix for from the exam service
        #[arg(long)]
        exam: Option<String>,

        /// Student to check in with the exam service (requires --exam)
        #[arg(long, requires = "exam")]
        student: Option<String>,

        /// Seed for reproducible question selection
        #[arg(long)]
        seed: Option<u64>,

        /// Output file for the paper JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a free-practice paper for a grade and topics
    Practice {
        /// Question bank file or directory (defaults to `bank` in the config)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Grade to draw from
        #[arg(long)]
        grade: u32,

        /// Topics to draw from (comma-separated)
        #[arg(long)]
        topics: String,

        /// Multiple-choice question count
        #[arg(long, default_value = "0")]
        mc: u32,

        /// True/false set count
        #[arg(long, default_value = "0")]
        tf: u32,

        /// Short-answer question count
        #[arg(long, default_value = "0")]
        sa: u32,

        /// Points for the multiple-choice section
        #[arg(long, default_value = "0.0")]
        mc_points: f64,

        /// Points for the true/false section
        #[arg(long, default_value = "0.0")]
        tf_points: f64,

        /// Points for the short-answer section
        #[arg(long, default_value = "0.0")]
        sa_points: f64,

        /// Time limit in minutes (0 for untimed)
        #[arg(long, default_value = "45")]
        minutes: u32,

        /// Seed for reproducible question selection
        #[arg(long)]
        seed: Option<u64>,

        /// Output file for the paper JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a set of answers against a paper
    Score {
        /// Paper JSON written by `generate` or `practice`
        #[arg(long)]
        paper: PathBuf,

        /// Answers JSON: an object mapping question id to answer
        #[arg(long)]
        answers: PathBuf,

        /// Student name
        #[arg(long, default_value = "anonymous")]
        student: String,

        /// Number of violations recorded during the attempt
        #[arg(long, default_value = "0")]
        violations: u32,

        /// Seconds spent on the attempt
        #[arg(long, default_value = "0")]
        elapsed: u64,

        /// Submit the result to the exam service
        #[arg(long)]
        submit: bool,

        /// Exam code to submit under (defaults to the paper's exam code)
        #[arg(long)]
        exam: Option<String>,

        /// Output file for the result JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question banks and matrices
    Validate {
        /// Question bank file or directory
        #[arg(long)]
        bank: PathBuf,

        /// Matrix TOML file to check against the bank
        #[arg(long)]
        matrix: Option<PathBuf>,
    },

    /// Create starter config, bank and matrix
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizforge=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            bank,
            matrix,
            exam,
            student,
            seed,
            output,
            config,
        } => commands::generate::execute(bank, matrix, exam, student, seed, output, config).await,
        Commands::Practice {
            bank,
            grade,
            topics,
            mc,
            tf,
            sa,
            mc_points,
            tf_points,
            sa_points,
            minutes,
            seed,
            output,
            config,
        } => commands::practice::execute(commands::practice::PracticeArgs {
            bank,
            grade,
            topics,
            counts: [mc, tf, sa],
            points: [mc_points, tf_points, sa_points],
            minutes,
            seed,
            output,
            config,
        }),
        Commands::Score {
            paper,
            answers,
            student,
            violations,
            elapsed,
            submit,
            exam,
            output,
            format,
            config,
        } => {
            commands::score::execute(commands::score::ScoreArgs {
                paper,
                answers,
                student,
                violations,
                elapsed,
                submit,
                exam,
                output,
                format,
                config,
            })
            .await
        }
        Commands::Validate { bank, matrix } => commands::validate::execute(bank, matrix),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
