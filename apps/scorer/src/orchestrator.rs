//! Runs the rubric over one résumé and assembles the report.
//!
//! Keyword evidence is gathered first (the only async step), then every registry
//! parameter is evaluated inside its own failure boundary. A scorer that returns an error,
//! produces a non-finite score or panics yields a zero-score result carrying the error
//! text; the rest of the report is unaffected.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::errors::ScoringError;
use crate::matching::{HybridMatcher, DEFAULT_THRESHOLD};
use crate::models::report::round1;
use crate::models::{
    Aggregation, Category, CategoryBreakdown, Diagnostics, ParameterResult,
    ResumeDocument, ScoreReport, ScoringContext,
};
use crate::registry::{ParameterSpec, Registry};
use crate::roles::{RoleCatalog, RoleProfile};
use crate::scoring::{KeywordEvidence, ScoringInput};
use crate::similarity::SimilarityProvider;
use crate::text::full_text;

/// Keyphrases taken from a job description and added to the required keywords.
const JD_KEYPHRASES: usize = 10;
const JD_DIVERSITY: f64 = 0.5;

#[derive(Clone)]
pub struct Orchestrator {
    matcher: HybridMatcher,
    catalog: Arc<RoleCatalog>,
    registry: Arc<Registry>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn SimilarityProvider>, catalog: RoleCatalog) -> Self {
        Self {
            matcher: HybridMatcher::new(provider),
            catalog: Arc::new(catalog),
            registry: Arc::new(Registry::standard()),
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn provider(&self) -> &Arc<dyn SimilarityProvider> {
        self.matcher.provider()
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Scores against today's date.
    pub async fn score(&self, resume: &ResumeDocument, context: &ScoringContext) -> ScoreReport {
        self.score_at(resume, context, Utc::now().date_naive()).await
    }

    /// Scores with an explicit reference date for recency and "Present" ranges.
    pub async fn score_at(
        &self,
        resume: &ResumeDocument,
        context: &ScoringContext,
        today: NaiveDate,
    ) -> ScoreReport {
        let role = self.catalog.get(&context.role_id);
        if role.is_none() {
            warn!(
                "Unknown role '{}'; keyword parameters get full credit",
                context.role_id
            );
        }

        let keywords = self.gather_keywords(resume, context, role).await;
        let input = ScoringInput::new(resume, context, keywords, today);

        let results: Vec<ParameterResult> = self
            .registry
            .specs()
            .iter()
            .map(|spec| evaluate(spec, &input))
            .collect();

        let failed_parameters: Vec<String> = results
            .iter()
            .filter(|r| r.failed())
            .map(|r| r.code.clone())
            .collect();
        let mut categories = breakdown(&self.registry, results);
        let aggregation = match role.and_then(|r| r.category_weights.clone()) {
            Some(weights) => Aggregation::RoleWeighted { weights },
            None => Aggregation::Raw,
        };
        let total_score = round1(aggregate(&categories, &aggregation));
        // Displayed subtotals only; the total above uses the exact sums.
        for category in categories.values_mut() {
            category.score = round1(category.score);
        }

        info!(
            "Scored résumé for role '{}' ({}): {} ({} failed parameters)",
            context.role_id,
            context.level,
            total_score,
            failed_parameters.len()
        );

        ScoreReport {
            total_score,
            role_id: role.map_or_else(|| context.role_id.clone(), |r| r.id.clone()),
            level: context.level,
            aggregation,
            similarity_backend: self.provider().active_backend().await.to_string(),
            categories,
            failed_parameters,
        }
    }

    /// Required and preferred keyword summaries against the résumé text. Job description
    /// keyphrases join the required list.
    async fn gather_keywords(
        &self,
        resume: &ResumeDocument,
        context: &ScoringContext,
        role: Option<&RoleProfile>,
    ) -> KeywordEvidence {
        let mut required = role
            .map(|r| r.required_for(context.level))
            .unwrap_or_default();
        let preferred = role
            .map(|r| r.preferred_for(context.level))
            .unwrap_or_default();

        if let Some(jd) = context.job_description() {
            let phrases = self
                .provider()
                .extract_keyphrases(jd, JD_KEYPHRASES, JD_DIVERSITY)
                .await;
            debug!("Added {} job description keyphrases", phrases.len());
            required.extend(phrases.into_iter().map(|k| k.phrase));
        }

        let text = full_text(resume);
        KeywordEvidence {
            required: self.matcher.summary(&required, &text, DEFAULT_THRESHOLD).await,
            preferred: self.matcher.summary(&preferred, &text, DEFAULT_THRESHOLD).await,
        }
    }
}

fn evaluate(spec: &ParameterSpec, input: &ScoringInput<'_>) -> ParameterResult {
    let max = f64::from(spec.max);
    let floor = f64::from(spec.floor);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (spec.scorer)(input)))
        .unwrap_or_else(|payload| Err(ScoringError::parameter(spec.code, panic_message(payload))))
        .and_then(|outcome| {
            if outcome.score.is_finite() {
                Ok(outcome)
            } else {
                Err(ScoringError::parameter(spec.code, "scorer produced a non-finite score"))
            }
        });

    match outcome {
        Ok(outcome) => ParameterResult {
            code: spec.code.to_string(),
            name: spec.name.to_string(),
            category: spec.category,
            score: outcome.score.clamp(floor, max),
            max,
            floor,
            message: outcome.message,
            diagnostics: outcome.diagnostics,
            error: None,
        },
        Err(err) => {
            warn!("Parameter {} failed: {}", spec.code, err);
            let error = err.to_string();
            ParameterResult {
                code: spec.code.to_string(),
                name: spec.name.to_string(),
                category: spec.category,
                score: 0.0,
                max,
                floor,
                message: format!("Could not be evaluated: {error}"),
                diagnostics: Diagnostics::Failure {
                    error: error.clone(),
                },
                error: Some(error),
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

fn breakdown(
    registry: &Registry,
    results: Vec<ParameterResult>,
) -> BTreeMap<Category, CategoryBreakdown> {
    let mut categories: BTreeMap<Category, CategoryBreakdown> = BTreeMap::new();
    for result in results {
        let entry = categories
            .entry(result.category)
            .or_insert_with(|| CategoryBreakdown {
                score: 0.0,
                max: f64::from(registry.category_max(result.category)),
                parameters: BTreeMap::new(),
            });
        entry.score += result.score;
        entry.parameters.insert(result.code.clone(), result);
    }
    categories
}

/// Raw: the clamped sum of category scores. Role-weighted: each category normalised to
/// [0, 1], weighted, and rescaled to 100 over the categories that carry weight.
fn aggregate(categories: &BTreeMap<Category, CategoryBreakdown>, aggregation: &Aggregation) -> f64 {
    let total = match aggregation {
        Aggregation::Raw => categories.values().map(|c| c.score).sum::<f64>(),
        Aggregation::RoleWeighted { weights } => {
            let mut weighted = 0.0;
            let mut weight_sum = 0.0;
            for (category, breakdown) in categories {
                let weight = weights.get(category).copied().unwrap_or(0.0);
                if breakdown.max <= 0.0 || weight <= 0.0 {
                    continue;
                }
                weighted += weight * (breakdown.score / breakdown.max).clamp(0.0, 1.0);
                weight_sum += weight;
            }
            if weight_sum > 0.0 {
                weighted / weight_sum * 100.0
            } else {
                0.0
            }
        }
    };
    total.clamp(0.0, 100.0)
}
