//! Configuration loaders for Kappa.
//!
//! `kappa.toml` is optional: a missing or malformed file falls back to
//! defaults. Ingestor YAML files are not: a namespace cannot open without a
//! readable, well-formed ingestor table.

use std::path::Path;

use kappa_types::config::KappaConfig;
use kappa_types::error::ConfigError;
use kappa_types::ingestor::IngestorConfig;

/// Name of the global config file inside the data directory.
pub const CONFIG_FILE: &str = "kappa.toml";

/// Load global configuration from `{data_dir}/kappa.toml`.
///
/// - If the file does not exist, returns [`KappaConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_kappa_config(data_dir: &Path) -> KappaConfig {
    let config_path = data_dir.join(CONFIG_FILE);
    load_kappa_config_from(&config_path).await
}

/// Load global configuration from an explicit path.
pub async fn load_kappa_config_from(config_path: &Path) -> KappaConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No kappa.toml found at {}, using defaults", config_path.display());
            return KappaConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return KappaConfig::default();
        }
    };

    match toml::from_str::<KappaConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            KappaConfig::default()
        }
    }
}

/// Read and parse a namespace's ingestor YAML.
pub async fn load_ingestor_config(path: &Path) -> Result<IngestorConfig, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    parse_ingestor_config(path, &content)
}

fn parse_ingestor_config(path: &Path, content: &str) -> Result<IngestorConfig, ConfigError> {
    // An empty document deserializes to `null`; treat it as an empty table so
    // compilation reports the missing ingestors instead of a parse error.
    if content.trim().is_empty() {
        return Ok(IngestorConfig::default());
    }
    serde_yaml_ng::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kappa_types::config::{EmbeddingProviderKind, VectorBackend};
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_kappa_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_kappa_config(tmp.path()).await;
        assert_eq!(config.default_n_results, 1);
        assert!(config.namespaces.is_empty());
    }

    #[tokio::test]
    async fn load_kappa_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
vector_backend = "memory"

[embedding]
provider = "hash"

[[namespaces]]
name = "semantic"
ingestors = "semantic.yml"
required_ingestors = ["api_doc"]
"#,
        )
        .await
        .unwrap();

        let config = load_kappa_config(tmp.path()).await;
        assert_eq!(config.vector_backend, VectorBackend::Memory);
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::Hash);
        assert_eq!(config.namespaces[0].required_ingestors, vec!["api_doc"]);
    }

    #[tokio::test]
    async fn load_kappa_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_kappa_config(tmp.path()).await;
        assert_eq!(config.vector_backend, VectorBackend::Lance);
    }

    #[tokio::test]
    async fn load_ingestor_config_parses_yaml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("semantic.yml");
        tokio::fs::write(
            &path,
            "ingestors:\n  api_doc:\n    text_fields: [endpoint.name]\n",
        )
        .await
        .unwrap();

        let config = load_ingestor_config(&path).await.unwrap();
        assert_eq!(config.ingestors["api_doc"].text_fields, vec!["endpoint.name"]);
    }

    #[tokio::test]
    async fn load_ingestor_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_ingestor_config(&tmp.path().join("nope.yml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn load_ingestor_config_malformed_yaml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.yml");
        tokio::fs::write(&path, "ingestors: [unclosed").await.unwrap();
        let err = load_ingestor_config(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn load_ingestor_config_empty_file_is_empty_table() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.yml");
        tokio::fs::write(&path, "\n").await.unwrap();
        assert!(load_ingestor_config(&path).await.unwrap().ingestors.is_empty());
    }

    fn shipped(file: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config").join(file)
    }

    #[tokio::test]
    async fn shipped_ingestor_configs_compile() {
        use kappa_core::memory::schema::SchemaRegistry;

        let semantic = load_ingestor_config(&shipped("semantic.yml")).await.unwrap();
        let registry = SchemaRegistry::compile("semantic", semantic).unwrap();
        assert_eq!(registry.names(), vec!["api_doc", "concept"]);
        assert_eq!(registry.collection_name(), "semantic_docs_collection");

        let episodic = load_ingestor_config(&shipped("episodic.yml")).await.unwrap();
        let registry = SchemaRegistry::compile("episodic", episodic).unwrap();
        let episode = registry.get("learning_episode").unwrap();
        assert_eq!(episode.text_fields.len(), 4);
        assert_eq!(episode.metadata["outcome"], "episode.outcome");
    }

    #[tokio::test]
    async fn shipped_kappa_toml_parses() {
        let config = load_kappa_config_from(&shipped("kappa.toml")).await;
        assert_eq!(config.default_n_results, 3);
        assert_eq!(config.namespaces.len(), 2);
        assert_eq!(config.namespace("episodic").unwrap().required_ingestors, vec!["failure_fix"]);
    }
}
