// Text-quality classifiers.
// Implements: action-verb tiers, quantification quality, vague-phrase and passive-voice detection.
// Pure functions of text: no I/O, no shared mutable state, identical input gives identical output.

pub mod action_verbs;
pub mod passive_voice;
pub mod quantification;
pub mod vague_phrases;

pub use action_verbs::{VerbStats, VerbTier};
pub use quantification::{MetricQuality, QuantificationSummary};
pub use vague_phrases::VagueReport;
