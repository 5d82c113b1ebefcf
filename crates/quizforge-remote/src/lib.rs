//! quizforge-remote: Exam service integration.
//!
//! Talks to the spreadsheet-backed exam service that owns matrices,
//! check-ins and submitted results, and loads the tool's configuration.

pub mod config;
pub mod error;
pub mod mock;
pub mod service;
pub mod sheet;

pub use config::{create_service, load_config, QuizforgeConfig};
pub use error::RemoteError;
pub use service::{CheckIn, ExamService};
