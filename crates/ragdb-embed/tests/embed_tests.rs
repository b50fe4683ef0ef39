use ragdb_core::config::EmbeddingConfig;
use ragdb_core::traits::Embedder;
use ragdb_embed::{default_embedder, HashEmbedder};

#[test]
fn hash_embedder_shape_norm_and_determinism() {
    let embedder = HashEmbedder::new(384);
    let v1 = embedder.embed("hello world").expect("embed");
    let v2 = embedder.embed("hello world").expect("embed");

    assert_eq!(v1.len(), 384);
    assert_eq!(embedder.dim(), 384);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Bit-identical for the same input
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn hash_embedder_shared_tokens_give_positive_similarity() {
    let embedder = HashEmbedder::new(64);
    let a = embedder.embed("LangChain connects LLMs with external data sources.").expect("embed");
    let b = embedder.embed("What does LangChain do?").expect("embed");
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    assert!(dot > 0.0, "shared token must yield positive cosine similarity");
}

#[test]
fn default_embedder_honors_use_fake() {
    let cfg = EmbeddingConfig { use_fake: true, dim: 128, ..EmbeddingConfig::default() };
    let embedder = default_embedder(&cfg).expect("embedder");
    assert_eq!(embedder.dim(), 128);
    let v = embedder.embed("anything").expect("embed");
    assert_eq!(v.len(), 128);
}
