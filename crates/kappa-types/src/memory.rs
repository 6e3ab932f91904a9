//! Memory records, retrieval results and tool arguments.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::graph::NodeView;

/// Flat metadata stored alongside a vector record.
pub type Metadata = BTreeMap<String, Value>;

/// Metadata key holding the serialized alias -> node id map.
pub const GRAPH_NODES_KEY: &str = "graph_nodes";

/// Metadata key holding the owning namespace.
pub const NAMESPACE_KEY: &str = "namespace";

/// Id reported for ingests that produced no vector record.
pub const GRAPH_ONLY_SENTINEL: &str = "graph-only";

/// Generate a namespace-prefixed memory id (`mem_{namespace}_{uuid}`).
pub fn new_memory_id(namespace: &str) -> String {
    format!("mem_{namespace}_{}", Uuid::now_v7())
}

/// One entry in a vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

/// One nearest-neighbor hit, in index ranking order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorHit {
    pub id: String,
    pub metadata: Metadata,
    /// Cosine distance in [0, 2].
    pub distance: f32,
}

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// A vector record was written under `memory_id`.
    Stored {
        memory_id: String,
        graph_nodes: BTreeMap<String, String>,
    },
    /// No text resolved: only the graph was mutated.
    GraphOnly { graph_nodes: BTreeMap<String, String> },
}

impl IngestOutcome {
    /// The memory id, or [`GRAPH_ONLY_SENTINEL`] for graph-only entries.
    pub fn memory_id(&self) -> &str {
        match self {
            IngestOutcome::Stored { memory_id, .. } => memory_id,
            IngestOutcome::GraphOnly { .. } => GRAPH_ONLY_SENTINEL,
        }
    }

    /// Aliases touched by the ingest and the node ids they resolved to.
    pub fn graph_nodes(&self) -> &BTreeMap<String, String> {
        match self {
            IngestOutcome::Stored { graph_nodes, .. } | IngestOutcome::GraphOnly { graph_nodes } => {
                graph_nodes
            }
        }
    }

    pub fn is_graph_only(&self) -> bool {
        matches!(self, IngestOutcome::GraphOnly { .. })
    }
}

/// A vector hit fused with the graph context of the nodes it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalMatch {
    pub memory_id: String,
    pub metadata: Metadata,
    pub graph_context: BTreeMap<String, NodeView>,
    /// `clamp(1 - distance / 2, 0, 1)`.
    pub similarity_score: f32,
    pub distance: f32,
}

/// Counts for one namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub nodes: usize,
    pub edges: usize,
    pub vectors: u64,
}

/// Arguments of the `{namespace}_retrieve` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RetrieveArgs {
    /// Description of the task to find related memories for.
    pub new_task_description: String,
    /// Number of matches to return (default 1).
    #[serde(default)]
    pub n_results: Option<usize>,
}

/// Arguments of the `{namespace}_ingest` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IngestArgs {
    /// Name of the ingestor recipe to apply.
    pub ingestor: String,
    /// Structured content to remember.
    pub payload: serde_json::Map<String, Value>,
}

/// Arguments of the `{namespace}_lookup` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LookupArgs {
    /// Id of a graph node, e.g. one surfaced by a previous retrieval.
    pub node_id: String,
    /// Hops of neighbor expansion (default 0: the node and its edges).
    #[serde(default)]
    pub depth: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_id_is_namespace_prefixed_and_unique() {
        let a = new_memory_id("semantic");
        let b = new_memory_id("semantic");
        assert!(a.starts_with("mem_semantic_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_ingest_outcome_memory_id() {
        let stored = IngestOutcome::Stored {
            memory_id: "mem_x_1".into(),
            graph_nodes: BTreeMap::new(),
        };
        assert_eq!(stored.memory_id(), "mem_x_1");
        assert!(!stored.is_graph_only());

        let graph_only = IngestOutcome::GraphOnly {
            graph_nodes: BTreeMap::from([("tool".to_string(), "RSI".to_string())]),
        };
        assert_eq!(graph_only.memory_id(), GRAPH_ONLY_SENTINEL);
        assert_eq!(graph_only.graph_nodes()["tool"], "RSI");
    }

    #[test]
    fn test_ingest_outcome_serde_tag() {
        let outcome = IngestOutcome::GraphOnly {
            graph_nodes: BTreeMap::new(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"kind\":\"graph_only\""));
    }

    #[test]
    fn test_retrieve_args_default_n_results() {
        let args: RetrieveArgs =
            serde_json::from_str(r#"{"new_task_description": "RSI"}"#).unwrap();
        assert_eq!(args.n_results, None);
    }
}
