//! The rubric: every scored parameter with its category, bounds and scorer.
//!
//! The standard table is checked at compile time: non-penalty maxima add up to
//! [`RUBRIC_TOTAL`] and codes are unique. Custom tables go through
//! [`Registry::from_specs`], which applies the same checks at runtime.

use std::collections::HashSet;

use crate::errors::ScoringError;
use crate::models::Category;
use crate::scoring::{
    content, experience, format, keywords, language, professional, structure, ScorerFn,
};

pub const RUBRIC_TOTAL: u32 = 100;

#[derive(Debug, Clone, Copy)]
pub struct ParameterSpec {
    pub code: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub max: u32,
    /// Negative for penalty-only parameters, 0 otherwise.
    pub floor: i32,
    pub scorer: ScorerFn,
}

impl ParameterSpec {
    pub fn is_penalty(&self) -> bool {
        self.max == 0 && self.floor < 0
    }
}

const fn spec(
    code: &'static str,
    name: &'static str,
    category: Category,
    max: u32,
    floor: i32,
    scorer: ScorerFn,
) -> ParameterSpec {
    ParameterSpec {
        code,
        name,
        category,
        max,
        floor,
        scorer,
    }
}

pub const PARAMETERS: &[ParameterSpec] = &[
    spec("P1.1", "Required keywords", Category::Keywords, 25, 0, keywords::required_keywords),
    spec("P1.2", "Preferred keywords", Category::Keywords, 10, 0, keywords::preferred_keywords),
    spec("P2.1", "Action-verb quality", Category::ContentQuality, 15, 0, content::action_verbs),
    spec("P2.2", "Quantification", Category::ContentQuality, 10, 0, content::quantification),
    spec("P2.3", "Achievement depth", Category::ContentQuality, 5, 0, content::achievement_depth),
    spec("P3.1", "Word count", Category::Format, 3, 0, format::word_count),
    spec("P3.2", "Page count", Category::Format, 2, 0, format::page_count),
    spec("P3.3", "ATS formatting", Category::Format, 3, 0, format::ats_formatting),
    spec("P3.4", "Section completeness", Category::Format, 2, 0, format::section_completeness),
    spec("P3.5", "Date formatting", Category::Format, 0, -2, format::date_formatting),
    spec("P4.1", "Grammar & mechanics", Category::Language, 4, 0, language::grammar),
    spec("P4.2", "Readability", Category::Language, 3, 0, language::readability),
    spec("P4.3", "Passive voice", Category::Language, 0, -5, language::passive_voice),
    spec("P5.1", "Professional standards", Category::Professional, 3, 0, professional::professional_standards),
    spec("P5.2", "Contact information", Category::Professional, 2, 0, professional::contact_information),
    spec("P6.1", "Years alignment", Category::Experience, 4, 0, experience::years_alignment),
    spec("P6.2", "Career recency", Category::Experience, 3, 0, experience::career_recency),
    spec("P6.3", "Experience depth", Category::Experience, 3, 0, experience::experience_depth),
    spec("P7.1", "Bullet structure", Category::Structure, 3, 0, structure::bullet_structure),
];

const fn max_total(specs: &[ParameterSpec]) -> u32 {
    let mut total = 0;
    let mut i = 0;
    while i < specs.len() {
        total += specs[i].max;
        i += 1;
    }
    total
}

const fn same_code(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn codes_unique(specs: &[ParameterSpec]) -> bool {
    let mut i = 0;
    while i < specs.len() {
        let mut j = i + 1;
        while j < specs.len() {
            if same_code(specs[i].code, specs[j].code) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(max_total(PARAMETERS) == RUBRIC_TOTAL, "rubric maxima must sum to 100");
const _: () = assert!(codes_unique(PARAMETERS), "parameter codes must be unique");

/// Immutable parameter table in report order.
#[derive(Debug, Clone)]
pub struct Registry {
    specs: Vec<ParameterSpec>,
}

impl Registry {
    pub fn standard() -> Self {
        Self {
            specs: PARAMETERS.to_vec(),
        }
    }

    pub fn from_specs(specs: Vec<ParameterSpec>) -> Result<Self, ScoringError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if spec.code.trim().is_empty() {
                return Err(ScoringError::Configuration("parameter with empty code".into()));
            }
            if !seen.insert(spec.code) {
                return Err(ScoringError::Configuration(format!(
                    "duplicate parameter code '{}'",
                    spec.code
                )));
            }
            if spec.floor > 0 {
                return Err(ScoringError::Configuration(format!(
                    "parameter '{}' has a positive floor",
                    spec.code
                )));
            }
        }
        let total = max_total(&specs);
        if total != RUBRIC_TOTAL {
            return Err(ScoringError::Configuration(format!(
                "parameter maxima sum to {total}, expected {RUBRIC_TOTAL}"
            )));
        }
        Ok(Self { specs })
    }

    pub fn get(&self, code: &str) -> Option<&ParameterSpec> {
        self.specs.iter().find(|s| s.code == code)
    }

    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &ParameterSpec> {
        self.specs.iter().filter(move |s| s.category == category)
    }

    /// Sum of the maxima in one category.
    pub fn category_max(&self, category: Category) -> u32 {
        self.by_category(category).map(|s| s.max).sum()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}
