//! Applies an ingestor's graph spec to a payload.

use std::collections::BTreeMap;

use kappa_types::graph::GraphNode;
use kappa_types::ingestor::{EdgeSpec, Endpoint, GraphSpec};
use serde_json::Value;

use super::graph::PropertyGraph;
use super::path::{extract, scalar_id};

/// Upsert the nodes and edges `spec` describes for `payload`.
///
/// Returns the alias -> node id map of nodes touched by this call. Nodes whose
/// key does not resolve and edges with an empty endpoint set are skipped.
pub fn mutate(
    graph: &mut PropertyGraph,
    spec: &GraphSpec,
    payload: &Value,
) -> BTreeMap<String, String> {
    let mut aliases = BTreeMap::new();

    for node_spec in &spec.nodes {
        let Some(id) = extract(payload, Some(&node_spec.key)).and_then(scalar_id) else {
            tracing::debug!(alias = %node_spec.alias, key = %node_spec.key, "node key unresolved, skipping");
            continue;
        };

        let mut node = GraphNode::new(id.clone(), node_spec.type_tag());
        for (name, path) in &node_spec.attributes {
            if let Some(value) = extract(payload, Some(path)) {
                node.attributes.insert(name.clone(), value.clone());
            }
        }
        graph.upsert_node(node);
        aliases.insert(node_spec.alias.clone(), id);
    }

    for edge in &spec.edges {
        let sources = resolve(graph, &aliases, edge.source_endpoint(), payload);
        let targets = resolve(graph, &aliases, edge.target_endpoint(), payload);
        if sources.is_empty() || targets.is_empty() {
            tracing::debug!(label = %edge.label, "edge endpoint unresolved, skipping");
            continue;
        }
        add_product(graph, edge, &sources, &targets);
    }

    aliases
}

fn add_product(graph: &mut PropertyGraph, edge: &EdgeSpec, sources: &[String], targets: &[String]) {
    for source in sources {
        for target in targets {
            graph.add_edge(source, target, &edge.label);
        }
    }
}

/// Ids one side of an edge refers to.
fn resolve(
    graph: &PropertyGraph,
    aliases: &BTreeMap<String, String>,
    endpoint: Option<Endpoint<'_>>,
    payload: &Value,
) -> Vec<String> {
    match endpoint {
        Some(Endpoint::Alias(alias)) => aliases.get(alias).cloned().into_iter().collect(),
        Some(Endpoint::Key(path)) => {
            let candidates: Vec<String> = match extract(payload, Some(path)) {
                Some(Value::Array(items)) => items.iter().filter_map(scalar_id).collect(),
                Some(value) => scalar_id(value).into_iter().collect(),
                None => Vec::new(),
            };
            let mut ids: Vec<String> = Vec::with_capacity(candidates.len());
            for id in candidates {
                if graph.contains(&id) && !ids.contains(&id) {
                    ids.push(id);
                }
            }
            ids
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn graph_spec(yaml: &str) -> GraphSpec {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_nodes_use_key_type_and_attributes() {
        let spec = graph_spec(
            r#"
nodes:
  - id: tool
    key: endpoint.name
    type: tool
    attributes: { description: endpoint.description, missing: endpoint.nope }
  - id: section
    key: section.name
"#,
        );
        let payload = json!({
            "endpoint": {"name": "RSI", "description": "Relative Strength Index"},
            "section": {"name": "Indicators"}
        });

        let mut graph = PropertyGraph::new();
        let aliases = mutate(&mut graph, &spec, &payload);

        assert_eq!(aliases["tool"], "RSI");
        assert_eq!(aliases["section"], "Indicators");
        let rsi = graph.node("RSI").unwrap();
        assert_eq!(rsi.node_type, "tool");
        assert_eq!(rsi.attributes.len(), 1);
        assert_eq!(graph.node("Indicators").unwrap().node_type, "section");
    }

    #[test]
    fn test_unresolved_key_skips_node_and_its_edges() {
        let spec = graph_spec(
            r#"
nodes:
  - { id: tool, key: endpoint.name }
  - { id: section, key: section.name }
edges:
  - { label: BELONGS_TO, source: tool, target: section }
"#,
        );
        let mut graph = PropertyGraph::new();
        let aliases = mutate(&mut graph, &spec, &json!({"endpoint": {"name": "RSI"}, "section": {"name": null}}));

        assert_eq!(aliases.len(), 1);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_repeated_ingest_is_idempotent() {
        let spec = graph_spec(
            r#"
nodes:
  - { id: tool, key: name, type: tool }
  - { id: section, key: section }
edges:
  - { label: BELONGS_TO, source: tool, target: section }
"#,
        );
        let payload = json!({"name": "RSI", "section": "Indicators"});
        let mut graph = PropertyGraph::new();
        mutate(&mut graph, &spec, &payload);
        mutate(&mut graph, &spec, &payload);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_key_list_fans_out_over_existing_nodes() {
        let mut graph = PropertyGraph::new();
        for id in ["a", "b", "c"] {
            graph.upsert_node(GraphNode::new(id, "concept"));
        }
        let spec = graph_spec(
            r#"
nodes:
  - { id: episode, key: episode.id, type: Episode }
edges:
  - { label: MENTIONS, source_key: episode.concepts, target: episode }
"#,
        );
        let payload = json!({"episode": {"id": "x", "concepts": ["a", "b", "c", "ghost", "a"]}});
        let before = graph.edge_count();
        mutate(&mut graph, &spec, &payload);

        assert_eq!(graph.edge_count() - before, 3);
        let incoming: Vec<String> = graph
            .view("x")
            .unwrap()
            .neighbors
            .incoming
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(incoming, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_scalar_key_requires_existing_node() {
        let spec = graph_spec(
            r#"
nodes:
  - { id: fix, key: fix.id }
edges:
  - { label: FIXES, source: fix, target_key: fix.failure }
"#,
        );
        let mut graph = PropertyGraph::new();
        mutate(&mut graph, &spec, &json!({"fix": {"id": "f1", "failure": "e1"}}));
        assert_eq!(graph.edge_count(), 0);

        graph.upsert_node(GraphNode::new("e1", "Failure"));
        mutate(&mut graph, &spec, &json!({"fix": {"id": "f1", "failure": "e1"}}));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.view("f1").unwrap().neighbors.outgoing[0].id, "e1");
    }

    #[test]
    fn test_default_label_applies() {
        let spec = graph_spec(
            r#"
nodes:
  - { id: a, key: a }
  - { id: b, key: b }
edges:
  - { source: a, target: b }
"#,
        );
        let mut graph = PropertyGraph::new();
        mutate(&mut graph, &spec, &json!({"a": 1, "b": 2}));
        assert_eq!(graph.view("1").unwrap().neighbors.outgoing[0].label, "RELATED_TO");
    }
}
