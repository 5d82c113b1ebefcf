//! In-memory exam service for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizforge_core::model::MatrixSpec;
use quizforge_core::report::ExamResult;

use crate::error::RemoteError;
use crate::service::{CheckIn, ExamService};

/// An exam service that serves fixed matrices and records what it receives.
#[derive(Default)]
pub struct MockService {
    /// Matrices keyed by exam code.
    matrices: HashMap<String, MatrixSpec>,
    call_count: AtomicU32,
    check_ins: Mutex<Vec<CheckIn>>,
    submissions: Mutex<Vec<(String, ExamResult)>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `matrix` for `exam_code`.
    pub fn with_matrix(mut self, exam_code: &str, matrix: MatrixSpec) -> Self {
        self.matrices.insert(exam_code.to_string(), matrix);
        self
    }

    /// Number of calls made to this service.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn check_ins(&self) -> Vec<CheckIn> {
        self.check_ins.lock().unwrap().clone()
    }

    /// Submitted results, paired with their exam code.
    pub fn submissions(&self) -> Vec<(String, ExamResult)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExamService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_matrix(&self, exam_code: &str) -> anyhow::Result<MatrixSpec> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.matrices
            .get(exam_code)
            .cloned()
            .ok_or_else(|| RemoteError::ExamNotFound(exam_code.to_string()).into())
    }

    async fn check_in(&self, check_in: &CheckIn) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.check_ins.lock().unwrap().push(check_in.clone());
        Ok(())
    }

    async fn submit_result(&self, exam_code: &str, result: &ExamResult) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.submissions
            .lock()
            .unwrap()
            .push((exam_code.to_string(), result.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quizforge_core::matrix::parse_matrix;

    fn spec() -> MatrixSpec {
        MatrixSpec {
            multiple_choice: Some("[6]; 12.4.3".into()),
            duration_minutes: 30.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn serves_known_matrix() {
        let service = MockService::new().with_matrix("MATH12", spec());

        let fetched = service.fetch_matrix("MATH12").await.unwrap();
        let parsed = parse_matrix(&fetched).unwrap();
        assert_eq!(parsed.requested(), 3);
        assert_eq!(parsed.duration_secs, 1800);

        let err = service.fetch_matrix("OTHER").await.unwrap_err();
        assert!(err.to_string().contains("exam not found: OTHER"));
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn records_check_ins() {
        let service = MockService::new();
        let check_in = CheckIn {
            student: "ana".into(),
            class_name: None,
            exam_code: "MATH12".into(),
            started_at: Utc::now(),
        };

        service.check_in(&check_in).await.unwrap();
        assert_eq!(service.check_ins(), vec![check_in]);
        assert!(service.submissions().is_empty());
    }
}
