//! # TF-IDF Vectorizer
//!
//! Builds a bag-of-n-grams vector space over the flat corpus of every template
//! example and projects utterances into it. The space is fixed once built:
//! n-grams unseen at build time carry no weight at query time.

use crate::text::{ngrams, tokenize, NgramRange};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// A dense embedding in a `VectorSpace`.
pub type Vector = Vec<f64>;

/// A fixed vocabulary of n-grams with their inverse document frequencies.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: NgramRange,
}

impl VectorSpace {
    /// Builds the space from `corpus`, one document per entry.
    ///
    /// IDF is smoothed (`ln((1 + n) / (1 + df)) + 1`) so that a term present in
    /// every document still carries weight. Dimensions are ordered
    /// lexicographically by n-gram.
    pub fn build<S: AsRef<str>>(
        corpus: &[S],
        ngram_range: NgramRange,
        max_features: Option<usize>,
    ) -> Self {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        let mut term_freq: HashMap<String, usize> = HashMap::new();

        for doc in corpus {
            let grams = ngrams(&tokenize(doc.as_ref()), ngram_range);
            let mut seen = HashSet::new();
            for gram in grams {
                *term_freq.entry(gram.clone()).or_insert(0) += 1;
                if seen.insert(gram.clone()) {
                    *doc_freq.entry(gram).or_insert(0) += 1;
                }
            }
        }

        if let Some(limit) = max_features {
            if doc_freq.len() > limit {
                let mut ranked: Vec<(&String, usize)> = term_freq
                    .iter()
                    .map(|(term, count)| (term, *count))
                    .collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                let keep: HashSet<String> = ranked
                    .into_iter()
                    .take(limit)
                    .map(|(term, _)| term.clone())
                    .collect();
                doc_freq.retain(|term, _| keep.contains(term));
            }
        }

        let n_docs = corpus.len() as f64;
        let mut vocabulary = HashMap::with_capacity(doc_freq.len());
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (index, (term, df)) in doc_freq.into_iter().enumerate() {
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        debug!(
            "Built vector space: {} documents, {} dimensions",
            corpus.len(),
            idf.len()
        );

        Self {
            vocabulary,
            idf,
            ngram_range,
        }
    }

    /// Projects `text` into the space as an L2-normalized TF-IDF vector.
    ///
    /// Out-of-vocabulary n-grams are dropped; text with no known n-gram yields
    /// the zero vector.
    pub fn embed(&self, text: &str) -> Vector {
        let mut vector = vec![0.0; self.idf.len()];
        for gram in ngrams(&tokenize(text), self.ngram_range) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                vector[index] += 1.0;
            }
        }
        for (weight, idf) in vector.iter_mut().zip(&self.idf) {
            *weight *= idf;
        }
        let norm = vector.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in &mut vector {
                *weight /= norm;
            }
        }
        vector
    }

    /// Number of dimensions (distinct n-grams kept).
    pub fn dimensions(&self) -> usize {
        self.idf.len()
    }

    pub fn contains(&self, gram: &str) -> bool {
        self.vocabulary.contains_key(gram)
    }

    pub fn ngram_range(&self) -> NgramRange {
        self.ngram_range
    }
}
