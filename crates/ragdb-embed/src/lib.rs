//! Embedding stage: maps text to a fixed-dimension dense vector.
//!
//! The real backend is a BERT-family encoder (e5-small-v2 class, D=384)
//! loaded from local files with candle; pooling is masked mean over unmasked
//! tokens followed by L2 normalization. A deterministic hash-bucket embedder
//! with the same contract is available for tests and offline runs.

pub mod device;
pub mod fake;
pub mod pool;
pub mod tokenize;

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use ragdb_core::config::{expand_path, EmbeddingConfig};
use ragdb_core::error::Error;
use ragdb_core::traits::Embedder;

pub use fake::HashEmbedder;

/// BERT pad token id; used both for padding and attention masking.
const PAD_ID: u32 = 0;

pub struct EncoderModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl EncoderModel {
    /// Load tokenizer, config and weights from `cfg.model_dir`. Fails with
    /// `ModelUnavailable` when files are missing and `InvalidConfig` when
    /// the checkpoint's hidden size disagrees with the configured dimension.
    pub fn load(cfg: &EmbeddingConfig) -> ragdb_core::error::Result<Self> {
        let model_dir = resolve_model_dir(&cfg.model_dir)
            .map_err(|e| Error::ModelUnavailable(e.to_string()))?;
        let device = device::select_device();

        tracing::info!(dir = %model_dir.display(), "loading encoder model");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            Error::ModelUnavailable(format!(
                "failed to load tokenizer from {}: {}",
                tokenizer_path.display(),
                e
            ))
        })?;

        let config_path = model_dir.join("config.json");
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| Error::ModelUnavailable(format!("read {}: {}", config_path.display(), e)))?;
        let hidden_size = parse_hidden_size(&raw)
            .map_err(|e| Error::ModelUnavailable(format!("parse {}: {}", config_path.display(), e)))?;
        if hidden_size != cfg.dim {
            return Err(Error::InvalidConfig(format!(
                "embedding.dim is {} but the checkpoint's hidden size is {}",
                cfg.dim, hidden_size
            )));
        }
        let config: BertConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::ModelUnavailable(format!("parse {}: {}", config_path.display(), e)))?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)
            .map_err(|e| Error::ModelUnavailable(format!("read {}: {}", weights_path.display(), e)))?;
        let weights_map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = BertModel::load(vb, &config)
            .map_err(|e| Error::ModelUnavailable(format!("load encoder weights: {}", e)))?;
        tracing::info!(dim = cfg.dim, max_len = cfg.max_len, "encoder model loaded");

        Ok(Self { model, tokenizer, device, dim: cfg.dim, max_len: cfg.max_len })
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) =
            tokenize::tokenize_on_device(&self.tokenizer, text, self.max_len, PAD_ID, &self.device)?;
        let token_type_ids = Tensor::zeros((1, self.max_len), DType::U32, &self.device)?;

        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = pool::masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        assert_eq!(emb.len(), self.dim);

        if start.elapsed().as_millis() > 100 {
            tracing::debug!(elapsed_ms = start.elapsed().as_millis(), len = text.len(), "slow embedding");
        }
        Ok(emb)
    }
}

impl Embedder for EncoderModel {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> ragdb_core::error::Result<Vec<f32>> {
        self.embed_text(text).map_err(|e| Error::ModelUnavailable(e.to_string()))
    }
}

/// Construct the embedder the configuration asks for.
pub fn default_embedder(cfg: &EmbeddingConfig) -> ragdb_core::error::Result<Arc<dyn Embedder>> {
    if cfg.use_fake {
        tracing::info!(dim = cfg.dim, "using hash embedder");
        return Ok(Arc::new(HashEmbedder::new(cfg.dim)));
    }
    Ok(Arc::new(EncoderModel::load(cfg)?))
}

fn parse_hidden_size(raw_config: &str) -> Result<usize> {
    let value: serde_json::Value = serde_json::from_str(raw_config)?;
    value["hidden_size"]
        .as_u64()
        .map(|v| v as usize)
        .ok_or_else(|| anyhow!("config.json has no hidden_size"))
}

fn resolve_model_dir(configured: &str) -> Result<PathBuf> {
    let p = expand_path(configured);
    if p.exists() {
        return Ok(p);
    }
    Err(anyhow!("embedding model directory not found: {}", p.display()))
}
