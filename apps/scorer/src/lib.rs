//! Résumé scoring engine.
//!
//! Scores a parsed résumé against a target role and experience level on a fixed
//! 100-point rubric. Keyword matching blends semantic similarity with exact term
//! matches; every parameter is scored in isolation so one failure never sinks a report.

pub mod classifiers;
pub mod config;
pub mod errors;
pub mod matching;
pub mod models;
pub mod orchestrator;
pub mod registry;
pub mod roles;
pub mod scoring;
pub mod similarity;
pub mod state;
pub mod text;

pub use errors::{ProviderError, ScoringError};
pub use models::{Level, ResumeDocument, ScoreReport, ScoringContext};
pub use orchestrator::Orchestrator;
pub use state::AppState;
