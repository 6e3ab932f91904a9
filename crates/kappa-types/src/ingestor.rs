//! Declarative ingestor schemas.
//!
//! An ingestor is a named recipe that maps an arbitrary JSON payload into a
//! vector-indexable text blob, a flat metadata map, and a set of graph
//! mutations. These types mirror the per-namespace YAML file one-to-one;
//! validation lives in `kappa_core::memory::schema`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A `.`-separated address into a nested JSON object (e.g. `endpoint.name`).
pub type DotPath = String;

/// Label used for edges that do not declare one.
pub const DEFAULT_EDGE_LABEL: &str = "RELATED_TO";

/// Top-level contents of a namespace's ingestor file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestorConfig {
    /// Vector collection settings.
    #[serde(default)]
    pub vector_store: VectorStoreSettings,

    /// Ingestor names that callers depend on; compilation fails if any is missing.
    #[serde(default)]
    pub required_ingestors: Vec<String>,

    /// Ingestor name -> definition.
    #[serde(default)]
    pub ingestors: BTreeMap<String, IngestorDefinition>,
}

/// Vector collection settings for a namespace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorStoreSettings {
    /// Suffix for the collection name (`{namespace}_{suffix}_collection`).
    /// Defaults to the namespace name.
    #[serde(default)]
    pub collection_suffix: Option<String>,
}

/// An ingestor as written in YAML.
///
/// Text fields and metadata may be given flat or nested under `vector:`;
/// both forms are merged when the schema is compiled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestorDefinition {
    #[serde(default)]
    pub text_fields: Vec<DotPath>,

    #[serde(default)]
    pub metadata: BTreeMap<String, DotPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<VectorSection>,

    #[serde(default)]
    pub graph: GraphSpec,
}

/// Nested `vector:` section of an ingestor definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorSection {
    #[serde(default)]
    pub text_fields: Vec<DotPath>,

    #[serde(default)]
    pub metadata: BTreeMap<String, DotPath>,
}

/// A compiled ingestor: immutable once the namespace is open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestorSpec {
    pub name: String,
    pub text_fields: Vec<DotPath>,
    pub metadata: BTreeMap<String, DotPath>,
    pub graph: GraphSpec,
}

/// Graph mutations described by an ingestor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSpec {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,

    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

/// A node to upsert on every ingest whose payload resolves `key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Call-scoped local name used to wire edges.
    #[serde(rename = "id", alias = "alias")]
    pub alias: String,

    /// Path to the value that becomes the node id.
    pub key: DotPath,

    /// Type tag; falls back to the alias.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    /// Attribute name -> path.
    #[serde(default)]
    pub attributes: BTreeMap<String, DotPath>,
}

impl NodeSpec {
    /// The type tag written to the graph.
    pub fn type_tag(&self) -> &str {
        self.node_type.as_deref().unwrap_or(&self.alias)
    }
}

/// A labeled edge between nodes of this call and/or pre-existing nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    #[serde(default = "default_edge_label")]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_key: Option<DotPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_key: Option<DotPath>,
}

fn default_edge_label() -> String {
    DEFAULT_EDGE_LABEL.to_string()
}

/// How one side of an edge is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// Alias of a node created in the same ingest call.
    Alias(&'a str),
    /// Path to the id (or list of ids) of nodes already in the graph.
    Key(&'a str),
}

impl EdgeSpec {
    /// Source endpoint, or `None` when both or neither form is given.
    pub fn source_endpoint(&self) -> Option<Endpoint<'_>> {
        endpoint(self.source.as_deref(), self.source_key.as_deref())
    }

    /// Target endpoint, or `None` when both or neither form is given.
    pub fn target_endpoint(&self) -> Option<Endpoint<'_>> {
        endpoint(self.target.as_deref(), self.target_key.as_deref())
    }
}

fn endpoint<'a>(alias: Option<&'a str>, key: Option<&'a str>) -> Option<Endpoint<'a>> {
    match (alias, key) {
        (Some(alias), None) => Some(Endpoint::Alias(alias)),
        (None, Some(key)) => Some(Endpoint::Key(key)),
        _ => None,
    }
}
