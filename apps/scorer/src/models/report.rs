use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifiers::action_verbs::VerbStats;
use crate::classifiers::quantification::QuantificationSummary;
use crate::classifiers::vague_phrases::VagueReport;
use crate::matching::MatchSummary;
use crate::models::context::Level;

/// Rubric categories. Declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Keywords,
    ContentQuality,
    Format,
    Language,
    Professional,
    Experience,
    Structure,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Keywords => "keywords",
            Category::ContentQuality => "content_quality",
            Category::Format => "format",
            Category::Language => "language",
            Category::Professional => "professional",
            Category::Experience => "experience",
            Category::Structure => "structure",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-family diagnostic payload attached to every parameter result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostics {
    Keywords {
        summary: MatchSummary,
        points_per_keyword: f64,
    },
    ActionVerbs {
        stats: VerbStats,
        required_coverage: f64,
        required_average_tier: f64,
    },
    Quantification(QuantificationSummary),
    VaguePhrases(VagueReport),
    /// Named measurements for the table-driven families. Ordered for stable output.
    Measurements(BTreeMap<String, f64>),
    Failure {
        error: String,
    },
}

impl Diagnostics {
    pub fn measurements<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Diagnostics::Measurements(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Final, clamped result for one rubric parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterResult {
    pub code: String,
    pub name: String,
    pub category: Category,
    pub score: f64,
    pub max: f64,
    /// 0 for ordinary parameters, negative for penalty-only ones.
    pub floor: f64,
    pub message: String,
    pub diagnostics: Diagnostics,
    /// Set when the scorer failed and the result is the zero-score substitute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParameterResult {
    pub fn is_penalty(&self) -> bool {
        self.max == 0.0 && self.floor < 0.0
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub score: f64,
    pub max: f64,
    pub parameters: BTreeMap<String, ParameterResult>,
}

/// How category subtotals were combined into the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Aggregation {
    Raw,
    RoleWeighted { weights: BTreeMap<Category, f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// 0–100, one decimal.
    pub total_score: f64,
    pub role_id: String,
    pub level: Level,
    pub aggregation: Aggregation,
    pub similarity_backend: String,
    pub categories: BTreeMap<Category, CategoryBreakdown>,
    pub failed_parameters: Vec<String>,
}

impl ScoreReport {
    pub fn parameter(&self, code: &str) -> Option<&ParameterResult> {
        self.categories
            .values()
            .find_map(|c| c.parameters.get(code))
    }

    pub fn parameters(&self) -> impl Iterator<Item = &ParameterResult> {
        self.categories.values().flat_map(|c| c.parameters.values())
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
