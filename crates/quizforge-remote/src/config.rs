//! Configuration and service factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::service::ExamService;
use crate::sheet::{SheetClient, DEFAULT_TIMEOUT_SECS};

/// Top-level quizforge configuration.
///
/// Note: Custom Debug impl masks the API key.
#[derive(Clone, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    /// Exam service endpoint. Matrices are fetched from and results sent to it.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Key sent as `x-api-key` on every service request.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Default question bank, a file or a directory.
    #[serde(default)]
    pub bank: Option<PathBuf>,
    /// Output directory for papers and results.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl std::fmt::Debug for QuizforgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizforgeConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("bank", &self.bank)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizforge-output")
}

impl Default for QuizforgeConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout(),
            bank: None,
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are taken literally; a `${` inside a value is not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        from = start + value.len();
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment variable overrides: `QUIZFORGE_ENDPOINT`, `QUIZFORGE_API_KEY`.
pub fn load_config() -> Result<QuizforgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizforge.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => parse_config_file(&path)?,
        None => QuizforgeConfig::default(),
    };

    if let Ok(endpoint) = std::env::var("QUIZFORGE_ENDPOINT") {
        config.endpoint = Some(endpoint);
    }
    if let Ok(key) = std::env::var("QUIZFORGE_API_KEY") {
        config.api_key = Some(key);
    }

    config.endpoint = config.endpoint.as_deref().map(resolve_env_vars);
    config.api_key = config.api_key.as_deref().map(resolve_env_vars);

    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<QuizforgeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<QuizforgeConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}

/// Create the exam service described by the configuration.
pub fn create_service(config: &QuizforgeConfig) -> Result<Box<dyn ExamService>> {
    let endpoint = config
        .endpoint
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .ok_or(RemoteError::NotConfigured)?;
    let client = SheetClient::new(endpoint, config.api_key.clone(), config.timeout_secs)?;
    Ok(Box::new(client))
}
