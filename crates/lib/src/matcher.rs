//! # Template Matcher
//!
//! Scores a query vector against every template's example vectors. A template's
//! score is its best-matching example, and the ranking is a total order: score
//! descending, then catalog position ascending.

use crate::vectorizer::Vector;
use serde::Serialize;
use std::cmp::Ordering;

/// One template's score against a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTemplate {
    /// Position of the template in its catalog.
    pub template_index: usize,
    pub template_id: String,
    pub description: String,
    pub score: f64,
}

/// A template's identity plus the embeddings of its examples.
#[derive(Debug, Clone)]
pub struct IndexedTemplate {
    pub template_id: String,
    pub description: String,
    pub example_vectors: Vec<Vector>,
}

/// Cosine similarity; 0.0 when either vector is zero or the lengths differ.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Ranks every template against `query`.
pub fn rank(query: &[f64], templates: &[IndexedTemplate]) -> Vec<ScoredTemplate> {
    let mut scored: Vec<ScoredTemplate> = templates
        .iter()
        .enumerate()
        .map(|(index, template)| ScoredTemplate {
            template_index: index,
            template_id: template.template_id.clone(),
            description: template.description.clone(),
            score: template
                .example_vectors
                .iter()
                .map(|example| cosine(query, example))
                .fold(0.0, f64::max),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.template_index.cmp(&b.template_index))
    });
    scored
}
