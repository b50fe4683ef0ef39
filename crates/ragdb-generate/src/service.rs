//! Generation service facade. Transport-agnostic: every reply is a
//! serde-serializable payload, so any wire binding stays a thin layer.

use serde::Serialize;
use std::sync::Arc;

use ragdb_core::error::{Error, ErrorBody};
use ragdb_core::traits::Generator;
use ragdb_core::types::GenerationRequest;

use crate::prompt::build_prompt;

pub struct GenerationService {
    generator: Arc<dyn Generator>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GenerateReply {
    Success {
        answer: String,
        generation_time: f64,
        model: String,
        context_length: usize,
        question: String,
    },
    Failure(ErrorBody),
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub model_type: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationHealth {
    pub status: String,
    pub service: String,
    pub model: String,
}

impl GenerationService {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Build the fixed prompt from the request and run the model. Field
    /// validation happens before the model is touched.
    pub fn generate(&self, req: &GenerationRequest) -> GenerateReply {
        if req.context.trim().is_empty() {
            return fail(&Error::Validation("missing 'context' in request".to_string()));
        }
        if req.question.trim().is_empty() {
            return fail(&Error::Validation("missing 'question' in request".to_string()));
        }

        tracing::info!(question = %req.question, context_length = req.context.len(), "generating response");
        let prompt = build_prompt(&req.context, &req.question);
        match self.generator.generate(&prompt) {
            Ok(generation) => GenerateReply::Success {
                answer: generation.answer,
                generation_time: generation.elapsed_secs,
                model: self.generator.model_name().to_string(),
                context_length: req.context.len(),
                question: req.question.clone(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "generation failed");
                fail(&err)
            }
        }
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_name: self.generator.model_name().to_string(),
            model_type: "causal language model".to_string(),
            status: "loaded".to_string(),
        }
    }

    pub fn health(&self) -> GenerationHealth {
        GenerationHealth {
            status: "healthy".to_string(),
            service: "generation".to_string(),
            model: self.generator.model_name().to_string(),
        }
    }
}

fn fail(err: &Error) -> GenerateReply {
    GenerateReply::Failure(ErrorBody::from(err))
}
