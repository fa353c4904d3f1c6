//! # Query Resolver
//!
//! `QueryEngine` turns an utterance into a `ResolutionResult` in one
//! deterministic pass:
//!
//! 1.  **Preprocess**: normalize; blank input stops here with `EMPTY_INPUT`.
//! 2.  **Retrieve**: embed and rank every template. A top score below the
//!     acceptance threshold stops with `LOW_CONFIDENCE`.
//! 3.  **Extract**: scan the original text for entities. This always runs, so
//!     failures can still report what was understood.
//! 4.  **Validate**: every required parameter of the top template must be present,
//!     otherwise `MISSING_PARAMETER` naming the first one absent.
//! 5.  **Bind**: substitute parameters, defaults and the table reference.
//! 6.  **Emit**: the SQL plus the ranked alternatives.
//!
//! The engine is immutable after construction and holds no per-request state,
//! so one instance can serve any number of concurrent callers.

use crate::{
    binder::bind,
    catalog::{Catalog, Template},
    config::EngineConfig,
    errors::EngineError,
    extractor::EntityExtractor,
    matcher::{rank, IndexedTemplate, ScoredTemplate},
    text::normalize,
    types::{Alternative, EntityBag, FailureReason, ParamName, ResolutionResult},
    vectorizer::VectorSpace,
};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// The template-retrieval and slot-filling engine.
#[derive(Debug)]
pub struct QueryEngine {
    catalog: Catalog,
    config: EngineConfig,
    space: VectorSpace,
    index: Vec<IndexedTemplate>,
    extractor: EntityExtractor,
}

impl QueryEngine {
    /// Builds the vector space over every example of `catalog` and embeds them.
    pub fn new(catalog: Catalog, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let extractor = EntityExtractor::new(&config)?;

        let corpus: Vec<&str> = catalog
            .templates()
            .iter()
            .flat_map(|t| t.examples.iter().map(String::as_str))
            .collect();
        let space = VectorSpace::build(&corpus, config.ngram_range, config.max_features);

        let index = catalog
            .templates()
            .iter()
            .map(|t| IndexedTemplate {
                template_id: t.id.clone(),
                description: t.description.clone(),
                example_vectors: t.examples.iter().map(|e| space.embed(e)).collect(),
            })
            .collect();

        info!(
            "Query engine ready: {} templates, {} examples, {} dimensions",
            catalog.len(),
            corpus.len(),
            space.dimensions()
        );

        Ok(Self {
            catalog,
            config,
            space,
            index,
            extractor,
        })
    }

    /// An engine over the built-in catalog with default tunables.
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(Catalog::load()?, EngineConfig::default())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn space(&self) -> &VectorSpace {
        &self.space
    }

    /// Scores every template against `utterance`, best first.
    pub fn rank(&self, utterance: &str) -> Vec<ScoredTemplate> {
        let query = self.space.embed(&normalize(utterance));
        rank(&query, &self.index)
    }

    /// Runs only the entity extractor over `utterance`.
    pub fn extract(&self, utterance: &str) -> EntityBag {
        self.extractor.extract(utterance)
    }

    /// Resolves `utterance` to SQL, or to a structured failure.
    pub fn resolve(&self, utterance: &str) -> ResolutionResult {
        if normalize(utterance).is_empty() {
            warn!("Rejected empty utterance");
            return ResolutionResult::empty_input();
        }

        let ranked = self.rank(utterance);
        let entities = self.extractor.extract(utterance);

        let Some(top) = ranked.first() else {
            // A validated catalog is never empty.
            return self.low_confidence(&ranked, entities);
        };
        debug!(
            "Top candidate '{}' scored {:.4} for '{}'",
            top.template_id, top.score, utterance
        );

        if top.score < self.config.acceptance_threshold {
            return self.low_confidence(&ranked, entities);
        }

        let template = &self.catalog.templates()[top.template_index];
        let alternatives = self.alternatives(&ranked, Some(top.template_index));

        if let Some(missing) = first_missing(template, &entities) {
            return self.missing_parameter(template, top.score, alternatives, entities, missing);
        }

        let mut values = BTreeMap::new();
        for param in &template.required_params {
            if let Some(value) = entities.get(*param) {
                values.insert(*param, value);
            }
        }
        for param in &template.optional_params {
            let value = entities
                .get(*param)
                .or_else(|| template.defaults.get(param).cloned());
            if let Some(value) = value {
                values.insert(*param, value);
            }
        }

        match bind(&template.sql_skeleton, &self.config.table_ref, &values) {
            Ok(sql) => {
                info!(
                    "Resolved to '{}' (confidence {:.3}): {}",
                    template.id, top.score, sql
                );
                ResolutionResult {
                    matched_template_id: Some(template.id.clone()),
                    description: Some(template.description.clone()),
                    confidence: top.score,
                    alternatives,
                    entities,
                    resolved_sql: Some(sql),
                    failure_reason: None,
                    missing_parameter: None,
                }
            }
            Err(missing) => {
                self.missing_parameter(template, top.score, alternatives, entities, missing)
            }
        }
    }

    /// The top `alternatives` candidates with a non-zero score, minus `chosen`.
    fn alternatives(&self, ranked: &[ScoredTemplate], chosen: Option<usize>) -> Vec<Alternative> {
        ranked
            .iter()
            .take(self.config.alternatives)
            .filter(|s| Some(s.template_index) != chosen && s.score > 0.0)
            .map(|s| Alternative {
                template_id: s.template_id.clone(),
                description: s.description.clone(),
                confidence: s.score,
            })
            .collect()
    }

    fn low_confidence(&self, ranked: &[ScoredTemplate], entities: EntityBag) -> ResolutionResult {
        let confidence = ranked.first().map(|s| s.score).unwrap_or(0.0);
        warn!(
            "No template reached the acceptance threshold {:.2} (best {:.3})",
            self.config.acceptance_threshold, confidence
        );
        ResolutionResult {
            matched_template_id: None,
            description: None,
            confidence,
            alternatives: self.alternatives(ranked, None),
            entities,
            resolved_sql: None,
            failure_reason: Some(FailureReason::LowConfidence),
            missing_parameter: None,
        }
    }

    fn missing_parameter(
        &self,
        template: &Template,
        confidence: f64,
        alternatives: Vec<Alternative>,
        entities: EntityBag,
        missing: ParamName,
    ) -> ResolutionResult {
        warn!(
            "Template '{}' matched but parameter '{}' is missing",
            template.id, missing
        );
        ResolutionResult {
            matched_template_id: Some(template.id.clone()),
            description: Some(template.description.clone()),
            confidence,
            alternatives,
            entities,
            resolved_sql: None,
            failure_reason: Some(FailureReason::MissingParameter),
            missing_parameter: Some(missing),
        }
    }
}

fn first_missing(template: &Template, entities: &EntityBag) -> Option<ParamName> {
    template
        .required_params
        .iter()
        .copied()
        .find(|param| !entities.contains(*param))
}

/// Holds the live engine and lets it be replaced without pausing readers.
///
/// Readers take an `Arc` snapshot and keep using it for the whole request; a
/// replacement only affects callers that arrive afterwards. Engines are never
/// mutated in place.
#[derive(Debug)]
pub struct SharedEngine {
    current: RwLock<Arc<QueryEngine>>,
}

impl SharedEngine {
    pub fn new(engine: QueryEngine) -> Self {
        Self {
            current: RwLock::new(Arc::new(engine)),
        }
    }

    /// A snapshot of the engine visible to new requests.
    pub fn current(&self) -> Arc<QueryEngine> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swaps in `engine`, returning the one it replaced.
    pub fn replace(&self, engine: QueryEngine) -> Arc<QueryEngine> {
        let next = Arc::new(engine);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        info!(
            "Swapping query engine ({} -> {} templates)",
            guard.catalog().len(),
            next.catalog().len()
        );
        std::mem::replace(&mut *guard, next)
    }
}
