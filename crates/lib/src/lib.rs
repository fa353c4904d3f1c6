//! # Natural Language to Query
//!
//! `slotql` turns analytics questions such as "customers spending more than $500"
//! into SQL without a language model. Each question is matched against a
//! catalog of parameterized query templates using TF-IDF similarity, entities
//! are extracted from the text, and the winning template's slots are filled
//! with safely quoted values.
//!
//! ```no_run
//! use slotql::QueryEngine;
//!
//! let engine = QueryEngine::with_defaults()?;
//! let result = engine.resolve("How many customers do we have?");
//! assert_eq!(result.matched_template_id.as_deref(), Some("count_customers"));
//! # Ok::<(), slotql::EngineError>(())
//! ```
//!
//! Running the SQL is a separate, opt-in step: see `executor::QueryExecutor` and
//! the `Storage` providers.

pub mod binder;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod errors;
pub mod executor;
pub mod extractor;
pub mod matcher;
pub mod providers;
pub mod render;
pub mod resolver;
pub mod text;
pub mod types;
pub mod vectorizer;

pub use catalog::{Catalog, Template};
pub use config::EngineConfig;
pub use errors::{CatalogError, ConfigError, EngineError, ExecutionError, StorageError};
pub use executor::{QueryExecutor, QueryOutput};
pub use providers::db::storage::Storage;
pub use render::ResultShape;
pub use resolver::{QueryEngine, SharedEngine};
pub use types::{
    Alternative, Comparison, EntityBag, FailureReason, ParamName, ParamValue, ResolutionResult,
    TimeWindow,
};

#[cfg(feature = "bigquery")]
pub use providers::db::bigquery::BigQueryProvider;
