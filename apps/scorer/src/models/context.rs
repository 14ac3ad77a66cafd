use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Target experience level. Drives every level-indexed threshold in the rubric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Beginner,
    /// The most common level; unknown input falls back here.
    #[default]
    Intermediary,
    Senior,
}

impl Level {
    /// Lenient parse: synonyms map onto the three levels, anything else becomes
    /// `Intermediary` with a warning instead of an error.
    pub fn parse_lenient(raw: &str) -> Level {
        match raw.trim().to_lowercase().as_str() {
            "beginner" | "entry" | "entry_level" | "entry-level" | "junior" | "graduate"
            | "intern" => Level::Beginner,
            "intermediary" | "intermediate" | "mid" | "mid_level" | "mid-level" => {
                Level::Intermediary
            }
            "senior" | "lead" | "principal" | "staff" | "expert" => Level::Senior,
            other => {
                warn!("Unknown level '{other}', defaulting to intermediary");
                Level::Intermediary
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediary => "intermediary",
            Level::Senior => "senior",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Level::parse_lenient).unwrap_or_default())
    }
}

/// What the résumé is being scored against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringContext {
    #[serde(default)]
    pub role_id: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub job_description: Option<String>,
}

impl ScoringContext {
    pub fn new(role_id: impl Into<String>, level: Level) -> Self {
        Self {
            role_id: role_id.into(),
            level,
            job_description: None,
        }
    }

    pub fn with_job_description(mut self, text: impl Into<String>) -> Self {
        self.job_description = Some(text.into());
        self
    }

    /// The job description, if one was supplied and is not blank.
    pub fn job_description(&self) -> Option<&str> {
        self.job_description
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
