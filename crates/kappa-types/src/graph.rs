//! Property graph types.
//!
//! Nodes are keyed by a string id that is unique within a namespace; edges
//! are labeled `(source, target, label)` triples. `GraphSnapshot` is the
//! persisted form, `NodeView` the expanded form returned by lookups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node in a namespace graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Merge another observation of the same node into this one.
    ///
    /// Attributes present in `other` overwrite ours; the rest are kept.
    pub fn merge(&mut self, other: GraphNode) {
        self.node_type = other.node_type;
        self.attributes.extend(other.attributes);
    }
}

/// A directed, labeled edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// Full serialized state of one namespace graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

/// The node on the other end of an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub label: String,
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

/// Outgoing and incoming neighbors of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Neighbors {
    pub outgoing: Vec<Neighbor>,
    pub incoming: Vec<Neighbor>,
}

impl Neighbors {
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty() && self.incoming.is_empty()
    }
}

/// A node together with its adjacent edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub attributes: BTreeMap<String, Value>,
    pub neighbors: Neighbors,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overwrites_and_keeps() {
        let mut node = GraphNode::new("RSI", "tool");
        node.attributes.insert("description".into(), json!("old"));
        node.attributes.insert("category".into(), json!("momentum"));

        let mut update = GraphNode::new("RSI", "indicator");
        update.attributes.insert("description".into(), json!("Relative Strength Index"));
        node.merge(update);

        assert_eq!(node.node_type, "indicator");
        assert_eq!(node.attributes["description"], json!("Relative Strength Index"));
        assert_eq!(node.attributes["category"], json!("momentum"));
    }

    #[test]
    fn test_node_view_serializes_type_field() {
        let view = NodeView {
            id: "RSI".into(),
            node_type: "tool".into(),
            attributes: BTreeMap::new(),
            neighbors: Neighbors::default(),
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["type"], "tool");
        assert_eq!(value["neighbors"], json!({"outgoing": [], "incoming": []}));
    }

    #[test]
    fn test_snapshot_deserializes_with_missing_sections() {
        let snapshot: GraphSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.nodes.is_empty());
        assert!(snapshot.edges.is_empty());
    }
}
