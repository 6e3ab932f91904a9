//! Ingestor schema compilation.
//!
//! Turns a namespace's `IngestorConfig` into an immutable registry of
//! `IngestorSpec`s, failing fast on anything that would make ingestion
//! ambiguous.

use std::collections::{BTreeMap, HashSet};

use kappa_types::error::ConfigError;
use kappa_types::ingestor::{
    EdgeSpec, Endpoint, IngestorConfig, IngestorDefinition, IngestorSpec,
};

/// Compiled, immutable ingestor table for one namespace.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    namespace: String,
    collection_suffix: Option<String>,
    specs: BTreeMap<String, IngestorSpec>,
}

impl SchemaRegistry {
    /// Validate and index every ingestor in `config`.
    ///
    /// Checks:
    /// - At least one ingestor exists
    /// - Every `required_ingestors` entry is defined
    /// - Node aliases are unique within an ingestor
    /// - Each edge endpoint names exactly one of alias / key
    /// - Edge aliases reference declared nodes
    pub fn compile(namespace: &str, config: IngestorConfig) -> Result<Self, ConfigError> {
        if config.ingestors.is_empty() {
            return Err(ConfigError::NoIngestors(namespace.to_string()));
        }

        for required in &config.required_ingestors {
            if !config.ingestors.contains_key(required) {
                return Err(ConfigError::MissingIngestor {
                    namespace: namespace.to_string(),
                    ingestor: required.clone(),
                });
            }
        }

        let mut specs = BTreeMap::new();
        for (name, definition) in config.ingestors {
            let spec = flatten(&name, definition);
            validate_graph(&spec)?;
            specs.insert(name, spec);
        }

        Ok(Self {
            namespace: namespace.to_string(),
            collection_suffix: config.vector_store.collection_suffix,
            specs,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Look up an ingestor by name.
    pub fn get(&self, name: &str) -> Option<&IngestorSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// All ingestor names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.specs.keys().map(String::as_str).collect()
    }

    /// Vector collection name: `{namespace}_{suffix}_collection`.
    pub fn collection_name(&self) -> String {
        let suffix = self
            .collection_suffix
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.namespace);
        format!("{}_{}_collection", self.namespace, suffix)
    }
}

/// Merge the flat and `vector:` forms of an ingestor definition.
fn flatten(name: &str, definition: IngestorDefinition) -> IngestorSpec {
    let mut text_fields = definition.text_fields;
    let mut metadata = definition.metadata;
    if let Some(vector) = definition.vector {
        text_fields.extend(vector.text_fields);
        // Flat entries win over nested ones with the same key.
        for (key, path) in vector.metadata {
            metadata.entry(key).or_insert(path);
        }
    }

    IngestorSpec {
        name: name.to_string(),
        text_fields,
        metadata,
        graph: definition.graph,
    }
}

fn validate_graph(spec: &IngestorSpec) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidIngestor {
        ingestor: spec.name.clone(),
        reason,
    };

    let mut aliases = HashSet::new();
    for node in &spec.graph.nodes {
        if node.alias.is_empty() {
            return Err(invalid("node alias must not be empty".to_string()));
        }
        if node.key.is_empty() {
            return Err(invalid(format!("node '{}' has an empty key", node.alias)));
        }
        if !aliases.insert(node.alias.as_str()) {
            return Err(invalid(format!("duplicate node alias '{}'", node.alias)));
        }
    }

    for edge in &spec.graph.edges {
        let source = edge
            .source_endpoint()
            .ok_or_else(|| invalid(endpoint_reason(edge, "source")))?;
        let target = edge
            .target_endpoint()
            .ok_or_else(|| invalid(endpoint_reason(edge, "target")))?;

        for endpoint in [source, target] {
            if let Endpoint::Alias(alias) = endpoint {
                if !aliases.contains(alias) {
                    return Err(invalid(format!(
                        "edge '{}' references unknown node alias '{alias}'",
                        edge.label
                    )));
                }
            }
        }
    }

    Ok(())
}

fn endpoint_reason(edge: &EdgeSpec, side: &str) -> String {
    format!(
        "edge '{}' must set exactly one of '{side}' or '{side}_key'",
        edge.label
    )
}
