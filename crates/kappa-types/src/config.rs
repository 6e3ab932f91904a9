//! Global configuration types for Kappa.
//!
//! `KappaConfig` represents the top-level `kappa.toml` that selects the
//! storage and embedding backends and lists the memory namespaces.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.kappa/kappa.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KappaConfig {
    /// Root directory for vector tables and graph files.
    /// Defaults to `{data_dir}/memory`.
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Which vector index implementation backs every namespace.
    #[serde(default)]
    pub vector_backend: VectorBackend,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Matches returned by `retrieve` when the caller does not ask for more.
    #[serde(default = "default_n_results")]
    pub default_n_results: usize,

    #[serde(default)]
    pub namespaces: Vec<NamespaceConfig>,
}

fn default_n_results() -> usize {
    1
}

impl Default for KappaConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            vector_backend: VectorBackend::default(),
            embedding: EmbeddingConfig::default(),
            default_n_results: default_n_results(),
            namespaces: Vec::new(),
        }
    }
}

impl KappaConfig {
    /// Find a namespace by name.
    pub fn namespace(&self, name: &str) -> Option<&NamespaceConfig> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }
}

/// Vector index implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    /// Embedded LanceDB tables on disk.
    #[default]
    Lance,
    /// Process-local index; contents are lost on exit.
    Memory,
}

/// Embedding provider selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    /// Model name understood by the provider.
    #[serde(default = "default_model")]
    pub model: String,

    /// Output dimension for the hashing provider (fastembed models are fixed).
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

fn default_model() -> String {
    "bge-small-en-v1.5".to_string()
}

fn default_dimension() -> usize {
    384
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            model: default_model(),
            dimension: default_dimension(),
        }
    }
}

/// Embedding provider implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Local ONNX inference via fastembed.
    #[default]
    Fastembed,
    /// Deterministic token hashing; offline, no model download.
    Hash,
}

/// One memory namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceConfig {
    pub name: String,
    /// Path to the namespace's ingestor YAML, relative to the data directory
    /// unless absolute.
    pub ingestors: PathBuf,

    /// Ingestors that must be defined, in addition to the file's own list.
    #[serde(default)]
    pub required_ingestors: Vec<String>,
}
