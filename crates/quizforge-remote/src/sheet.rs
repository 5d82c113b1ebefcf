//! Client for the spreadsheet-backed exam service.
//!
//! The service is a single web endpoint. Matrices are read with
//! `GET ?action=matrix&exam=<code>`; check-ins and results are sent as JSON
//! `POST`s carrying an `action` field.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizforge_core::model::MatrixSpec;
use quizforge_core::report::ExamResult;

use crate::error::RemoteError;
use crate::service::{CheckIn, ExamService};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the exam service.
pub struct SheetClient {
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl SheetClient {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout_secs,
            client,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, RemoteError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Timeout(self.timeout_secs)
            } else {
                RemoteError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        match status {
            401 | 403 => Err(RemoteError::Unauthorized(body)),
            s if s >= 400 => {
                let message = serde_json::from_str::<Envelope>(&body)
                    .ok()
                    .and_then(|e| e.message)
                    .unwrap_or(body);
                Err(RemoteError::Api { status: s, message })
            }
            _ => Ok(body),
        }
    }

    async fn post_action<T: Serialize + Sync>(&self, action: &str, payload: &T) -> Result<(), RemoteError> {
        let body = ActionRequest { action, payload };
        let text = self.send(self.client.post(&self.endpoint).json(&body)).await?;

        // Some deployments answer with an empty 200.
        if text.trim().is_empty() {
            return Ok(());
        }
        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|e| RemoteError::InvalidResponse(format!("failed to parse response: {e}")))?;
        envelope.check()
    }
}

#[derive(Serialize)]
struct ActionRequest<'a, T: Serialize> {
    action: &'a str,
    #[serde(flatten)]
    payload: &'a T,
}

#[derive(Serialize)]
struct SubmitPayload<'a> {
    exam_code: &'a str,
    result: &'a ExamResult,
}

/// Common response wrapper: `{"status": "ok" | "error", "message": ..., ...}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    matrix: Option<WireMatrix>,
}

impl Envelope {
    fn check(&self) -> Result<(), RemoteError> {
        match self.status.as_deref() {
            Some("error") => Err(RemoteError::Api {
                status: 200,
                message: self.message.clone().unwrap_or_default(),
            }),
            _ => Ok(()),
        }
    }
}

/// Matrix fields as the service names them.
#[derive(Debug, Deserialize)]
struct WireMatrix {
    #[serde(default)]
    mc: Option<String>,
    #[serde(default)]
    tf: Option<String>,
    #[serde(default)]
    sa: Option<String>,
    #[serde(default, alias = "level3")]
    tier3: Option<String>,
    #[serde(default, alias = "level4")]
    tier4: Option<String>,
    #[serde(default)]
    duration: f64,
}

impl From<WireMatrix> for MatrixSpec {
    fn from(wire: WireMatrix) -> Self {
        let non_blank = |field: Option<String>| field.filter(|f| !f.trim().is_empty());
        MatrixSpec {
            multiple_choice: non_blank(wire.mc),
            true_false: non_blank(wire.tf),
            short_answer: non_blank(wire.sa),
            tier3: non_blank(wire.tier3),
            tier4: non_blank(wire.tier4),
            duration_minutes: wire.duration,
        }
    }
}

#[async_trait]
impl ExamService for SheetClient {
    fn name(&self) -> &str {
        "sheet"
    }

    #[instrument(skip(self))]
    async fn fetch_matrix(&self, exam_code: &str) -> anyhow::Result<MatrixSpec> {
        let url = reqwest::Url::parse_with_params(
            &self.endpoint,
            &[("action", "matrix"), ("exam", exam_code)],
        )
        .with_context(|| format!("invalid endpoint URL: {}", self.endpoint))?;

        let text = self.send(self.client.get(url)).await.map_err(|e| match e {
            RemoteError::Api { status: 404, .. } => RemoteError::ExamNotFound(exam_code.to_string()),
            other => other,
        })?;

        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|e| RemoteError::InvalidResponse(format!("failed to parse matrix: {e}")))?;
        envelope.check()?;

        let matrix = envelope
            .matrix
            .ok_or_else(|| RemoteError::ExamNotFound(exam_code.to_string()))?;
        tracing::debug!(exam_code, "fetched matrix");
        Ok(matrix.into())
    }

    #[instrument(skip(self, check_in), fields(student = %check_in.student, exam = %check_in.exam_code))]
    async fn check_in(&self, check_in: &CheckIn) -> anyhow::Result<()> {
        self.post_action("checkin", check_in).await?;
        Ok(())
    }

    #[instrument(skip(self, result), fields(student = %result.student, score = result.score))]
    async fn submit_result(&self, exam_code: &str, result: &ExamResult) -> anyhow::Result<()> {
        self.post_action("submit", &SubmitPayload { exam_code, result })
            .await?;
        Ok(())
    }
}
