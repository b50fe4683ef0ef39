//! Domain types shared by the store, the models and the pipeline.

use serde::{Deserialize, Serialize};

/// A stored unit of retrievable text.
///
/// - `id`: unique, monotonically assigned at insertion, immutable
/// - `content`: non-empty text payload, immutable after creation
/// - `embedding`: dense vector of the store's fixed dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: i64,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// One ranked search candidate. `distance` is cosine distance
/// (`1 - cosine_similarity`, range [0, 2]); lower is more similar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub distance: f32,
}

/// Input to the generation stage. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub context: String,
    pub question: String,
}

/// Output of one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub answer: String,
    pub elapsed_secs: f64,
}
