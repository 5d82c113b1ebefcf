//! The exam service seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quizforge_core::model::MatrixSpec;
use quizforge_core::report::ExamResult;

/// Remote collaborator that owns matrices and collects results.
#[async_trait]
pub trait ExamService: Send + Sync {
    /// Human-readable service name.
    fn name(&self) -> &str;

    /// Fetch the matrix configured for an exam code.
    async fn fetch_matrix(&self, exam_code: &str) -> anyhow::Result<MatrixSpec>;

    /// Announce that a student has started an exam.
    async fn check_in(&self, check_in: &CheckIn) -> anyhow::Result<()>;

    /// Submit a finished attempt's result.
    async fn submit_result(&self, exam_code: &str, result: &ExamResult) -> anyhow::Result<()>;
}

/// A student starting an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub student: String,
    #[serde(default)]
    pub class_name: Option<String>,
    pub exam_code: String,
    pub started_at: DateTime<Utc>,
}
