use serde::{Deserialize, Serialize};
use slotql::{QueryOutput, ResolutionResult};

/// The request body for `/resolve` and `/query`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UtteranceRequest {
    pub utterance: String,
}

/// The response body for `/query`.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub resolution: ResolutionResult,
    /// A user-facing explanation when the resolution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<QueryOutput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExamplesResponse {
    pub examples: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub table_ref: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub templates: usize,
}
