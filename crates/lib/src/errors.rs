use thiserror::Error;

/// Errors raised while loading or validating a template catalog.
///
/// Any of these means the process cannot start with this catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse catalog YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Catalog contains no templates")]
    Empty,
    #[error("Template id must not be empty")]
    EmptyId,
    #[error("Duplicate template id '{0}'")]
    DuplicateId(String),
    #[error("Template '{0}' has no example phrasings")]
    NoExamples(String),
    #[error("Template '{0}' has a blank example phrasing")]
    BlankExample(String),
    #[error("Template '{template}' declares parameter '{param}' but its SQL skeleton has no `{{{param}}}` slot")]
    MissingSlot { template: String, param: String },
    #[error("Template '{template}' has slot `{{{slot}}}` that is not a declared parameter")]
    UndeclaredSlot { template: String, slot: String },
    #[error("Template '{template}' declares parameter '{param}' as both required and optional")]
    ConflictingParam { template: String, param: String },
    #[error("Template '{template}' has optional parameter '{param}' without a default value")]
    MissingDefault { template: String, param: String },
    #[error("Template '{template}' has an invalid default for '{param}': {reason}")]
    InvalidDefault {
        template: String,
        param: String,
        reason: String,
    },
    #[error("Template '{template}' has a default for '{param}', which is not an optional parameter")]
    UnexpectedDefault { template: String, param: String },
}

/// Errors raised when an `EngineConfig` fails validation.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("acceptance_threshold must be within 0.0..=1.0, got {0}")]
    Threshold(f64),
    #[error("ngram_range must satisfy 1 <= min <= max, got {min}..={max}")]
    NgramRange { min: usize, max: usize },
    #[error("max_features must be greater than zero")]
    MaxFeatures,
    #[error("table_ref '{0}' is not a valid fully-qualified identifier")]
    TableRef(String),
    #[error("{0} contains an empty phrase")]
    EmptyPhrase(&'static str),
}

/// Errors raised while constructing a `QueryEngine`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Errors raised by a storage provider.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage query execution failed: {0}")]
    QueryFailed(String),
    #[error("Invalid table name: {0}")]
    InvalidTable(String),
    #[error("Failed to serialize result: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

/// Errors raised while executing a resolved query.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Resolution did not produce SQL; nothing to execute")]
    NotResolved,
    #[error("Query timed out after {0} seconds")]
    Timeout(u64),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Storage returned malformed rows: {0}")]
    MalformedRows(#[from] serde_json::Error),
}
