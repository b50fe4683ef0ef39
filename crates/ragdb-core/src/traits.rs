use crate::error::Result;
use crate::types::Generation;

/// Maps text to a fixed-dimension dense vector. Deterministic for fixed
/// weights and input; over-long input is truncated to the model's context
/// window (prefix kept, excess dropped).
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Maps a finished prompt to generated text plus wall-clock timing. The
/// generator is prompt-agnostic; callers own the template. Implementations
/// must decode only the newly generated continuation, never the echoed
/// prompt.
pub trait Generator: Send + Sync {
    fn model_name(&self) -> &str;
    fn generate(&self, prompt: &str) -> Result<Generation>;
}
