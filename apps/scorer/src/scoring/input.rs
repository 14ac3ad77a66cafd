//! Evidence handed to every scorer and the outcome each returns.

use chrono::NaiveDate;

use crate::errors::ScoringError;
use crate::matching::MatchSummary;
use crate::models::{Diagnostics, Level, ResumeDocument, ScoringContext};
use crate::text::{collect_bullets, full_text};

/// Keyword match summaries, computed asynchronously before the scorer pass.
/// An empty summary (no keywords for the role) earns full credit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordEvidence {
    pub required: MatchSummary,
    pub preferred: MatchSummary,
}

pub struct ScoringInput<'a> {
    pub resume: &'a ResumeDocument,
    pub context: &'a ScoringContext,
    pub keywords: KeywordEvidence,
    /// Every achievement bullet, glyphs stripped, document order.
    pub bullets: Vec<String>,
    /// All free text of the résumé joined by newlines.
    pub full_text: String,
    /// Reference date for recency and "Present" ranges.
    pub today: NaiveDate,
}

impl<'a> ScoringInput<'a> {
    pub fn new(
        resume: &'a ResumeDocument,
        context: &'a ScoringContext,
        keywords: KeywordEvidence,
        today: NaiveDate,
    ) -> Self {
        Self {
            resume,
            context,
            keywords,
            bullets: collect_bullets(resume),
            full_text: full_text(resume),
            today,
        }
    }

    pub fn level(&self) -> Level {
        self.context.level
    }
}

/// Unclamped scorer result; the orchestrator clamps `score` into [floor, max].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterOutcome {
    pub score: f64,
    pub message: String,
    pub diagnostics: Diagnostics,
}

impl ParameterOutcome {
    pub fn new(score: f64, message: impl Into<String>, diagnostics: Diagnostics) -> Self {
        Self {
            score,
            message: message.into(),
            diagnostics,
        }
    }
}

pub type ScorerFn = fn(&ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError>;
