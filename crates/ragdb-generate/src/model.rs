use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use candle_core::quantized::gguf_file;
use candle_core::{Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::quantized_llama::ModelWeights;
use tokenizers::Tokenizer;

use ragdb_core::config::{expand_path, GenerationConfig};
use ragdb_core::error::{Error, Result};
use ragdb_core::traits::Generator;
use ragdb_core::types::Generation;

/// Fixed seed; with no temperature the processor is argmax and the seed is
/// inert, but keeping it pinned makes any future sampling change explicit.
const GEN_SEED: u64 = 299792458;

pub struct LlamaGenerator {
    // The forward pass mutates the KV cache, so concurrent callers are
    // serialized here. One model instance, N callers queue.
    model: Mutex<ModelWeights>,
    tokenizer: Tokenizer,
    device: Device,
    model_name: String,
    max_new_tokens: usize,
    eos_token: u32,
}

impl LlamaGenerator {
    /// Load tokenizer and GGUF weights from `cfg.model_dir`. Weights are
    /// read once and held for the process lifetime.
    pub fn load(cfg: &GenerationConfig) -> Result<Self> {
        let model_dir = resolve_model_dir(&cfg.model_dir)?;
        let device = select_device();

        tracing::info!(dir = %model_dir.display(), model = %cfg.model_name, "loading generation model");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            Error::ModelUnavailable(format!(
                "failed to load tokenizer from {}: {}",
                tokenizer_path.display(),
                e
            ))
        })?;

        let gguf_path = model_dir.join(&cfg.model_file);
        let mut file = File::open(&gguf_path)
            .map_err(|e| Error::ModelUnavailable(format!("open {}: {}", gguf_path.display(), e)))?;
        let content = gguf_file::Content::read(&mut file)
            .map_err(|e| Error::ModelUnavailable(format!("read gguf {}: {}", gguf_path.display(), e)))?;
        let model = ModelWeights::from_gguf(content, &mut file, &device)
            .map_err(|e| Error::ModelUnavailable(format!("load gguf weights: {}", e)))?;

        let eos_token = tokenizer.token_to_id("</s>").unwrap_or(2);
        tracing::info!(max_new_tokens = cfg.max_new_tokens, "generation model loaded");

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            device,
            model_name: cfg.model_name.clone(),
            max_new_tokens: cfg.max_new_tokens,
            eos_token,
        })
    }
}

impl Generator for LlamaGenerator {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn generate(&self, prompt: &str) -> Result<Generation> {
        let start = Instant::now();
        let enc = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| Error::ModelUnavailable(format!("tokenization failed: {}", e)))?;
        let prompt_tokens = enc.get_ids().to_vec();

        let mut model = self
            .model
            .lock()
            .map_err(|_| Error::ModelUnavailable("generation model mutex poisoned".to_string()))?;
        let mut logits_processor = LogitsProcessor::new(GEN_SEED, None, None);

        // Prompt pass: index 0 resets the KV cache, the returned logits are
        // for the last prompt position only.
        let input = Tensor::new(prompt_tokens.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(model_err)?;
        let logits = model.forward(&input, 0).and_then(|l| l.squeeze(0)).map_err(model_err)?;
        let mut next = logits_processor.sample(&logits).map_err(model_err)?;

        // Decode only the continuation; the echoed prompt is never part of
        // the answer.
        let mut generated: Vec<u32> = Vec::new();
        while generated.len() < self.max_new_tokens {
            if next == self.eos_token {
                break;
            }
            generated.push(next);
            if generated.len() == self.max_new_tokens {
                break;
            }
            let input = Tensor::new(&[next], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(model_err)?;
            let logits = model
                .forward(&input, prompt_tokens.len() + generated.len() - 1)
                .and_then(|l| l.squeeze(0))
                .map_err(model_err)?;
            next = logits_processor.sample(&logits).map_err(model_err)?;
        }

        let answer = self
            .tokenizer
            .decode(&generated, true)
            .map_err(|e| Error::ModelUnavailable(format!("decoding failed: {}", e)))?
            .trim()
            .to_string();
        let elapsed_secs = start.elapsed().as_secs_f64();
        tracing::debug!(tokens = generated.len(), elapsed_secs, "generation finished");
        Ok(Generation { answer, elapsed_secs })
    }
}

fn model_err(e: candle_core::Error) -> Error {
    Error::ModelUnavailable(e.to_string())
}

fn resolve_model_dir(configured: &str) -> Result<PathBuf> {
    let p = expand_path(configured);
    if p.exists() {
        return Ok(p);
    }
    Err(Error::ModelUnavailable(format!("generation model directory not found: {}", p.display())))
}

fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(0) {
            tracing::info!("device: metal");
            return dev;
        }
    }
    tracing::debug!("device: cpu");
    Device::Cpu
}
