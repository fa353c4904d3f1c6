//! # Shared Constants
//!
//! Defaults for the tunables in `EngineConfig` and the slot names understood by
//! the binder. Keeping them here avoids magic strings across crates.

/// Minimum top-candidate score for a resolution to be accepted (inclusive).
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.30;

/// How many ranked runner-ups a resolution result carries.
pub const DEFAULT_ALTERNATIVES: usize = 3;

/// Shortest n-gram, in tokens.
pub const DEFAULT_NGRAM_MIN: usize = 1;

/// Longest n-gram, in tokens.
pub const DEFAULT_NGRAM_MAX: usize = 3;

/// The data-source identifier used when none is configured.
pub const DEFAULT_TABLE_REF: &str = "hackathon-475722.saas.ravenstack_subscriptions";

/// The slot that always receives the configured data-source identifier.
pub const TABLE_SLOT: &str = "table_ref";

/// Default timeout applied by `QueryExecutor`, in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Plan tiers recognised by the entity extractor, in priority order.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "basic",
    "premium",
    "enterprise",
    "pro",
    "starter",
    "business",
    "free",
];
