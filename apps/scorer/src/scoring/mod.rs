// Per-parameter scoring rules.
// Implements: one pure scorer function per rubric parameter, grouped by category.
// Scorers see precomputed evidence only (`ScoringInput`); the orchestrator clamps and
// isolates them.

pub mod bands;
pub mod content;
pub mod experience;
pub mod format;
pub mod input;
pub mod keywords;
pub mod language;
pub mod professional;
pub mod structure;

pub use input::{KeywordEvidence, ParameterOutcome, ScorerFn, ScoringInput};
