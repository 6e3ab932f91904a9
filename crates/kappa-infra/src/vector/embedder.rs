//! Embedding providers.
//!
//! `FastEmbedEmbedder` runs a local ONNX model through fastembed.
//! `HashEmbedder` is a deterministic bag-of-tokens projection that needs no
//! model download; identical texts always map to identical vectors.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use kappa_core::memory::embedder::Embedder;
use kappa_types::error::RepositoryError;

/// Supported fastembed models: config name, model, output dimension.
const FASTEMBED_MODELS: &[(&str, EmbeddingModel, usize)] = &[
    ("bge-small-en-v1.5", EmbeddingModel::BGESmallENV15, 384),
    ("bge-base-en-v1.5", EmbeddingModel::BGEBaseENV15, 768),
    ("all-minilm-l6-v2", EmbeddingModel::AllMiniLML6V2, 384),
    ("nomic-embed-text-v1.5", EmbeddingModel::NomicEmbedTextV15, 768),
];

/// Local embedding model.
///
/// Inference is CPU-bound and needs `&mut` access to the model, so calls run
/// on the blocking pool behind a mutex. Clones share the loaded model.
#[derive(Clone)]
pub struct FastEmbedEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedEmbedder {
    /// Load (downloading on first use) the named model into `cache_dir`.
    pub async fn load(model_name: &str, cache_dir: PathBuf) -> Result<Self, RepositoryError> {
        let (model, dimension) = lookup_model(model_name)?;

        let model = tokio::task::spawn_blocking(move || {
            TextEmbedding::try_new(
                InitOptions::new(model)
                    .with_cache_dir(cache_dir)
                    .with_show_download_progress(false),
            )
        })
        .await
        .map_err(|e| RepositoryError::Query(format!("embedding model load task failed: {e}")))?
        .map_err(|e| RepositoryError::Query(format!("failed to load {model_name}: {e}")))?;

        tracing::info!(model = model_name, dimension, "embedding model loaded");

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_name: model_name.to_string(),
            dimension,
        })
    }
}

fn lookup_model(name: &str) -> Result<(EmbeddingModel, usize), RepositoryError> {
    FASTEMBED_MODELS
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, model, dim)| (model.clone(), *dim))
        .ok_or_else(|| {
            let known: Vec<&str> = FASTEMBED_MODELS.iter().map(|(n, _, _)| *n).collect();
            RepositoryError::Query(format!(
                "unsupported embedding model '{name}' (expected one of: {})",
                known.join(", ")
            ))
        })
}

impl Embedder for FastEmbedEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RepositoryError> {
        let model = Arc::clone(&self.model);
        let text = text.to_string();

        let mut vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| RepositoryError::Query("embedding model lock poisoned".to_string()))?;
            model
                .embed(vec![text], None)
                .map_err(|e| RepositoryError::Query(format!("embedding failed: {e}")))
        })
        .await
        .map_err(|e| RepositoryError::Query(format!("embedding task failed: {e}")))??;

        vectors
            .pop()
            .ok_or_else(|| RepositoryError::Query("embedding model returned no vector".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Deterministic token-hashing embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Signed bag-of-tokens over lowercase alphanumeric tokens, L2-normalized.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

// FNV-1a: stable across toolchains, unlike `DefaultHasher`, so persisted
// vectors stay comparable.
fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

impl Embedder for HashEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RepositoryError> {
        Ok(self.embed_text(text))
    }

    fn model_name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
