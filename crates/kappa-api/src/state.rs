//! Application state wiring every namespace engine together.
//!
//! Engines are generic over embedder/index/persistence traits; AppState pins
//! them to the boxed infra implementations selected by `kappa.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use kappa_core::memory::box_embedder::BoxEmbedder;
use kappa_core::memory::box_vector::BoxVectorIndex;
use kappa_core::memory::embedder::Embedder;
use kappa_core::memory::engine::MemoryEngine;
use kappa_core::memory::schema::SchemaRegistry;
use kappa_core::memory::tool::MemoryTools;
use kappa_infra::config::{load_ingestor_config, load_kappa_config, load_kappa_config_from};
use kappa_infra::filesystem::{
    model_cache_dir, resolve_data_dir, resolve_relative, store_dir, vector_dir,
};
use kappa_infra::graph::file::JsonGraphFile;
use kappa_infra::vector::embedder::{FastEmbedEmbedder, HashEmbedder};
use kappa_infra::vector::in_memory::InMemoryVectorIndex;
use kappa_infra::vector::lance::LanceVectorStore;
use kappa_infra::vector::memory::LanceVectorIndex;
use kappa_types::config::{EmbeddingProviderKind, KappaConfig, NamespaceConfig, VectorBackend};

/// Concrete engine type pinned to the infra implementations.
pub type ConcreteEngine = MemoryEngine<BoxEmbedder, BoxVectorIndex, JsonGraphFile>;

pub type ConcreteTools = MemoryTools<BoxEmbedder, BoxVectorIndex, JsonGraphFile>;

/// One embedding provider shared by every namespace.
#[derive(Clone)]
enum SharedEmbedder {
    FastEmbed(FastEmbedEmbedder),
    Hash(HashEmbedder),
}

impl SharedEmbedder {
    async fn from_config(data_dir: &Path, config: &KappaConfig) -> anyhow::Result<Self> {
        Ok(match config.embedding.provider {
            EmbeddingProviderKind::Fastembed => SharedEmbedder::FastEmbed(
                FastEmbedEmbedder::load(&config.embedding.model, model_cache_dir(data_dir))
                    .await
                    .context("Failed to load embedding model")?,
            ),
            EmbeddingProviderKind::Hash => {
                SharedEmbedder::Hash(HashEmbedder::new(config.embedding.dimension))
            }
        })
    }

    fn boxed(&self) -> BoxEmbedder {
        match self {
            SharedEmbedder::FastEmbed(e) => BoxEmbedder::new(e.clone()),
            SharedEmbedder::Hash(e) => BoxEmbedder::new(e.clone()),
        }
    }
}

/// Shared application state holding every opened namespace.
pub struct AppState {
    pub data_dir: PathBuf,
    pub store_dir: PathBuf,
    pub config: KappaConfig,
    namespaces: BTreeMap<String, Arc<ConcreteEngine>>,
}

impl AppState {
    /// Resolve the data directory, load `kappa.toml` (or `config_path`) and
    /// open every configured namespace.
    pub async fn init(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = match config_path {
            Some(path) => load_kappa_config_from(&path).await,
            None => load_kappa_config(&data_dir).await,
        };

        Self::from_config(data_dir, config).await
    }

    pub async fn from_config(data_dir: PathBuf, config: KappaConfig) -> anyhow::Result<Self> {
        let store_dir = store_dir(&data_dir, &config);
        let mut namespaces = BTreeMap::new();

        // Model loading can download weights; skip it when nothing needs it.
        if !config.namespaces.is_empty() {
            let embedder = SharedEmbedder::from_config(&data_dir, &config).await?;
            for ns in &config.namespaces {
                if namespaces.contains_key(&ns.name) {
                    bail!("Namespace '{}' is configured more than once", ns.name);
                }
                let engine = open_namespace(&data_dir, &store_dir, &config, ns, &embedder)
                    .await
                    .with_context(|| format!("Failed to open namespace '{}'", ns.name))?;
                namespaces.insert(ns.name.clone(), Arc::new(engine));
            }
        }

        Ok(Self {
            data_dir,
            store_dir,
            config,
            namespaces,
        })
    }

    /// Look up an opened namespace engine.
    pub fn engine(&self, namespace: &str) -> anyhow::Result<&Arc<ConcreteEngine>> {
        self.namespaces.get(namespace).with_context(|| {
            let known: Vec<&str> = self.namespaces.keys().map(String::as_str).collect();
            if known.is_empty() {
                format!("Namespace '{namespace}' not found (no namespaces configured)")
            } else {
                format!(
                    "Namespace '{namespace}' not found (configured: {})",
                    known.join(", ")
                )
            }
        })
    }

    pub fn engines(&self) -> impl Iterator<Item = &Arc<ConcreteEngine>> {
        self.namespaces.values()
    }

    /// Agent tool factory for a namespace.
    pub fn tools(&self, namespace: &str) -> anyhow::Result<ConcreteTools> {
        let engine = self.engine(namespace)?;
        Ok(MemoryTools::for_engine(Arc::clone(engine))
            .with_default_n_results(self.config.default_n_results))
    }
}

async fn open_namespace(
    data_dir: &Path,
    store_dir: &Path,
    config: &KappaConfig,
    ns: &NamespaceConfig,
    embedder: &SharedEmbedder,
) -> anyhow::Result<ConcreteEngine> {
    let path = resolve_relative(data_dir, &ns.ingestors);
    let mut ingestors = load_ingestor_config(&path).await?;
    for required in &ns.required_ingestors {
        if !ingestors.required_ingestors.contains(required) {
            ingestors.required_ingestors.push(required.clone());
        }
    }
    let registry = SchemaRegistry::compile(&ns.name, ingestors)?;

    let embedder = embedder.boxed();
    let index = match config.vector_backend {
        VectorBackend::Lance => {
            let store = LanceVectorStore::new(vector_dir(store_dir))
                .await
                .context("Failed to open vector store")?;
            BoxVectorIndex::new(LanceVectorIndex::new(
                store,
                registry.collection_name(),
                &ns.name,
                embedder.dimension(),
            ))
        }
        VectorBackend::Memory => BoxVectorIndex::new(InMemoryVectorIndex::new()),
    };
    let persistence = JsonGraphFile::new(store_dir, &ns.name);

    Ok(MemoryEngine::open(registry, embedder, index, persistence).await?)
}
