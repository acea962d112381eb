//! Retrieval-augmented-generation citations attached to an answer.

use serde::{Deserialize, Serialize};

/// One retrieval source cited by an answer.
///
/// Stored inside the message's metadata blob by the chat pipeline and
/// surfaced verbatim by the listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrieverResource {
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub dataset_name: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub document_name: Option<String>,
    #[serde(default)]
    pub segment_id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub content: Option<String>,
}

impl RetrieverResource {
    /// Extracts retriever resources from a raw metadata blob.
    ///
    /// The metadata is an opaque JSON string owned by the chat pipeline;
    /// absent, empty, or malformed metadata yields an empty list rather
    /// than an error.
    pub fn extract_from_metadata(metadata: Option<&str>) -> Vec<RetrieverResource> {
        let Some(raw) = metadata else {
            return Vec::new();
        };
        if raw.trim().is_empty() {
            return Vec::new();
        }

        let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
            return Vec::new();
        };

        match value.get("retriever_resources") {
            Some(resources) => {
                serde_json::from_value(resources.clone()).unwrap_or_default()
            }
            None => Vec::new(),
        }
    }
}
