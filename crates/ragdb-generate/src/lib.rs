//! Generation stage: maps a finished prompt to new text plus timing.
//!
//! The real backend is a quantized llama-family model (TinyLlama class) in
//! GGUF form, decoded greedily for determinism. The model instance is
//! process-lifetime state behind a mutex; callers queue on it by design.

pub mod fake;
pub mod model;
pub mod prompt;
pub mod service;

use std::sync::Arc;

use ragdb_core::config::GenerationConfig;
use ragdb_core::traits::Generator;

pub use fake::EchoGenerator;
pub use model::LlamaGenerator;
pub use service::GenerationService;

/// Construct the generator the configuration asks for.
pub fn default_generator(cfg: &GenerationConfig) -> ragdb_core::error::Result<Arc<dyn Generator>> {
    if cfg.use_fake {
        tracing::info!(model = %cfg.model_name, "using echo generator");
        return Ok(Arc::new(EchoGenerator::new(&cfg.model_name)));
    }
    Ok(Arc::new(LlamaGenerator::load(cfg)?))
}
