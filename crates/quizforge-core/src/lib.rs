//! quizforge-core: Question bank, matrix parser, exam generator and scorer.
//!
//! A textual matrix is parsed into selection rules, the generator samples a
//! question sequence from the bank under those rules, and the scorer turns a
//! finished answer sheet into a number.

pub mod attempt;
pub mod bank;
pub mod error;
pub mod generator;
pub mod matrix;
pub mod model;
pub mod report;
pub mod scoring;
