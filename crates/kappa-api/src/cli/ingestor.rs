//! Namespace introspection: ingestor recipes and agent tool definitions.

use anyhow::Result;
use comfy_table::{Cell, Color};
use console::style;
use serde_json::json;

use kappa_types::ingestor::{EdgeSpec, Endpoint, IngestorSpec};

use super::memory::new_table;
use crate::state::AppState;

/// List the ingestors compiled for a namespace.
pub fn list_ingestors(state: &AppState, namespace: &str, json: bool) -> Result<()> {
    let engine = state.engine(namespace)?;
    let registry = engine.registry();
    let specs: Vec<&IngestorSpec> = registry
        .names()
        .into_iter()
        .filter_map(|name| registry.get(name))
        .collect();

    if json {
        let out = json!({
            "namespace": registry.namespace(),
            "collection": registry.collection_name(),
            "ingestors": specs,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(registry.namespace()).cyan().bold(),
        style(format!("collection {}", registry.collection_name())).dim(),
    );
    println!();

    let mut table = new_table(&["Ingestor", "Text fields", "Metadata", "Nodes", "Edges"]);
    for spec in &specs {
        let nodes: Vec<String> = spec
            .graph
            .nodes
            .iter()
            .map(|n| format!("{} ({}) <- {}", n.alias, n.type_tag(), n.key))
            .collect();
        let edges: Vec<String> = spec.graph.edges.iter().map(describe_edge).collect();
        let metadata: Vec<&str> = spec.metadata.keys().map(String::as_str).collect();

        table.add_row(vec![
            Cell::new(&spec.name).fg(Color::Cyan),
            Cell::new(or_dash(&spec.text_fields.join("\n"))).fg(Color::White),
            Cell::new(or_dash(&metadata.join(", "))).fg(Color::White),
            Cell::new(or_dash(&nodes.join("\n"))).fg(Color::Green),
            Cell::new(or_dash(&edges.join("\n"))).fg(Color::Yellow),
        ]);
    }
    println!("{table}");
    println!();

    Ok(())
}

/// Print the tool definitions an agent would be handed for a namespace.
pub fn list_tools(state: &AppState, namespace: &str, json: bool) -> Result<()> {
    let definitions = state.tools(namespace)?.definitions();

    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    println!();
    let mut table = new_table(&["Tool", "Description", "Parameters"]);
    for def in &definitions {
        let params: Vec<String> = def
            .parameters
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&def.name).fg(Color::Cyan),
            Cell::new(&def.description).fg(Color::White),
            Cell::new(params.join(", ")).fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
    println!();

    Ok(())
}

fn describe_edge(edge: &EdgeSpec) -> String {
    format!(
        "{} -[{}]-> {}",
        describe_endpoint(edge.source_endpoint()),
        edge.label,
        describe_endpoint(edge.target_endpoint()),
    )
}

fn describe_endpoint(endpoint: Option<Endpoint<'_>>) -> String {
    match endpoint {
        Some(Endpoint::Alias(alias)) => alias.to_string(),
        Some(Endpoint::Key(path)) => format!("@{path}"),
        None => "?".to_string(),
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_edge_marks_key_endpoints() {
        let edge: EdgeSpec = serde_json::from_value(json!({
            "label": "MENTIONS",
            "source_key": "episode.concepts",
            "target": "episode"
        }))
        .unwrap();
        assert_eq!(describe_edge(&edge), "@episode.concepts -[MENTIONS]-> episode");

        let edge: EdgeSpec = serde_json::from_value(json!({"source": "a"})).unwrap();
        assert_eq!(describe_edge(&edge), "a -[RELATED_TO]-> ?");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("x"), "x");
    }
}
