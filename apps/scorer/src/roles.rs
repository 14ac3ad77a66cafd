//! Role catalog: what each target role expects to see on a résumé.
//!
//! A built-in catalog covers common roles; `ROLE_CATALOG_PATH` can point at a JSON file
//! (`{"roles": [...]}`) that replaces it. Role ids are matched case-insensitively with
//! spaces and hyphens folded to underscores.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ScoringError;
use crate::models::{Category, Level};

/// Keywords that only apply at one level (e.g. leadership terms for seniors).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelKeywords {
    pub level: Level,
    pub required: Vec<String>,
    pub preferred: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleProfile {
    pub id: String,
    pub title: String,
    pub required: Vec<String>,
    pub preferred: Vec<String>,
    pub level_keywords: Vec<LevelKeywords>,
    /// Relative category weights. `None` ⇒ raw additive total.
    pub category_weights: Option<BTreeMap<Category, f64>>,
}

impl RoleProfile {
    /// Base required keywords plus the level's extras.
    pub fn required_for(&self, level: Level) -> Vec<String> {
        self.keywords_for(level, |p| &p.required, |l| &l.required)
    }

    pub fn preferred_for(&self, level: Level) -> Vec<String> {
        self.keywords_for(level, |p| &p.preferred, |l| &l.preferred)
    }

    fn keywords_for(
        &self,
        level: Level,
        base: impl Fn(&RoleProfile) -> &Vec<String>,
        extra: impl Fn(&LevelKeywords) -> &Vec<String>,
    ) -> Vec<String> {
        let mut keywords = base(self).clone();
        for entry in self.level_keywords.iter().filter(|l| l.level == level) {
            keywords.extend(extra(entry).iter().cloned());
        }
        keywords
    }

    fn validate(&self) -> Result<(), ScoringError> {
        if normalize_id(&self.id).is_empty() {
            return Err(ScoringError::Configuration("role with empty id".into()));
        }
        if let Some(weights) = &self.category_weights {
            if weights.values().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(ScoringError::Configuration(format!(
                    "role '{}' has a negative or non-finite category weight",
                    self.id
                )));
            }
            if weights.values().sum::<f64>() <= 0.0 {
                return Err(ScoringError::Configuration(format!(
                    "role '{}' category weights sum to zero",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    roles: Vec<RoleProfile>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    roles: BTreeMap<String, RoleProfile>,
}

impl RoleCatalog {
    pub fn from_roles(roles: Vec<RoleProfile>) -> Result<Self, ScoringError> {
        let mut catalog = BTreeMap::new();
        for role in roles {
            role.validate()?;
            let id = normalize_id(&role.id);
            if catalog.insert(id.clone(), role).is_some() {
                return Err(ScoringError::Configuration(format!("duplicate role id '{id}'")));
            }
        }
        Ok(Self { roles: catalog })
    }

    pub fn from_json(raw: &str) -> Result<Self, ScoringError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::from_roles(file.roles)
    }

    pub fn load(path: &Path) -> Result<Self, ScoringError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&raw)?;
        info!("Loaded {} roles from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn get(&self, role_id: &str) -> Option<&RoleProfile> {
        self.roles.get(&normalize_id(role_id))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn builtin() -> Self {
        let roles = builtin_roles()
            .into_iter()
            .map(|r| (normalize_id(&r.id), r))
            .collect();
        Self { roles }
    }
}

fn normalize_id(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in roles
// ────────────────────────────────────────────────────────────────────────────

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn role(id: &str, title: &str, required: &[&str], preferred: &[&str]) -> RoleProfile {
    RoleProfile {
        id: id.to_string(),
        title: title.to_string(),
        required: strings(required),
        preferred: strings(preferred),
        ..RoleProfile::default()
    }
}

impl RoleProfile {
    fn at_level(mut self, level: Level, required: &[&str], preferred: &[&str]) -> Self {
        self.level_keywords.push(LevelKeywords {
            level,
            required: strings(required),
            preferred: strings(preferred),
        });
        self
    }

    fn weighted(mut self, weights: &[(Category, f64)]) -> Self {
        self.category_weights = Some(weights.iter().copied().collect());
        self
    }
}

fn builtin_roles() -> Vec<RoleProfile> {
    vec![
        role(
            "software_engineer",
            "Software Engineer",
            &["software development", "git", "testing", "api", "sql", "debugging"],
            &["ci/cd", "docker", "cloud", "agile", "code review", "microservices"],
        )
        .at_level(Level::Senior, &["system design", "mentoring"], &["architecture", "technical leadership"]),
        role(
            "frontend_engineer",
            "Frontend Engineer",
            &["javascript", "typescript", "react", "html", "css"],
            &["accessibility", "performance", "testing", "design systems", "webpack"],
        )
        .at_level(Level::Senior, &["architecture"], &["mentoring"]),
        role(
            "data_scientist",
            "Data Scientist",
            &["python", "machine learning", "statistics", "sql", "data analysis"],
            &["deep learning", "pandas", "a/b testing", "spark", "data visualization", "nlp"],
        )
        .at_level(Level::Senior, &["experiment design"], &["mentoring", "mlops"]),
        role(
            "data_analyst",
            "Data Analyst",
            &["sql", "excel", "data analysis", "reporting", "dashboards"],
            &["python", "tableau", "power bi", "statistics", "stakeholder management"],
        ),
        role(
            "devops_engineer",
            "DevOps Engineer",
            &["ci/cd", "docker", "kubernetes", "linux", "infrastructure as code"],
            &["terraform", "aws", "monitoring", "ansible", "incident response", "python"],
        )
        .at_level(Level::Senior, &["reliability"], &["capacity planning"]),
        role(
            "product_manager",
            "Product Manager",
            &["product strategy", "roadmap", "stakeholder management", "user research", "prioritization"],
            &["a/b testing", "analytics", "agile", "go-to-market", "okrs", "sql"],
        )
        .at_level(Level::Senior, &["product vision"], &["team leadership"])
        .weighted(&[
            (Category::Keywords, 0.30),
            (Category::ContentQuality, 0.25),
            (Category::Format, 0.10),
            (Category::Language, 0.12),
            (Category::Professional, 0.08),
            (Category::Experience, 0.10),
            (Category::Structure, 0.05),
        ]),
    ]
}
