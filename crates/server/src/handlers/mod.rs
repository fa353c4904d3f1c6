//! # API Route Handlers
//!
//! The handlers are split by concern: service probes and catalog browsing in
//! `general`, resolution and execution in `query`, engine management in `admin`.

pub mod admin;
pub mod general;
pub mod query;

// Re-export all handlers so the router can reach them under `handlers::`.
pub use admin::*;
pub use general::*;
pub use query::*;

// Shared items used by multiple handler modules.
use super::{errors::AppError, state::AppState};
