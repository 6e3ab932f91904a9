//! Memory CLI commands: ingest, retrieve, lookup.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde_json::Value;

use kappa_types::graph::NodeView;
use kappa_types::memory::RetrievalMatch;

use crate::state::AppState;

/// Parse a payload argument: inline JSON, or `@path` to a JSON file.
pub async fn parse_payload(raw: &str) -> Result<Value> {
    let (content, source) = match raw.strip_prefix('@') {
        Some(path) => (
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read payload file {path}"))?,
            path,
        ),
        None => (raw.to_string(), "argument"),
    };

    let payload: Value = serde_json::from_str(&content)
        .with_context(|| format!("Payload {source} is not valid JSON"))?;
    if !payload.is_object() {
        bail!("Payload must be a JSON object");
    }
    Ok(payload)
}

/// Ingest a payload into a namespace.
///
/// # Examples
///
/// ```bash
/// kappa ingest semantic api_doc '{"endpoint":{"name":"RSI"}}'
/// kappa ingest episodic learning_episode @episode.json --json
/// ```
pub async fn ingest(
    state: &AppState,
    namespace: &str,
    ingestor: &str,
    payload: &str,
    json: bool,
) -> Result<()> {
    let engine = state.engine(namespace)?;
    let payload = parse_payload(payload).await?;
    let outcome = engine.ingest(ingestor, &payload).await?;

    if json {
        let out = serde_json::json!({
            "status": "success",
            "memory_id": outcome.memory_id(),
            "graph_nodes": outcome.graph_nodes(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    if outcome.is_graph_only() {
        println!(
            "  {} Graph-only entry in '{}' (no text fields resolved)",
            style("✓").green().bold(),
            style(namespace).cyan(),
        );
    } else {
        println!(
            "  {} Stored {} in '{}'",
            style("✓").green().bold(),
            style(outcome.memory_id()).bold(),
            style(namespace).cyan(),
        );
    }

    if !outcome.graph_nodes().is_empty() {
        println!();
        println!("{}", alias_table(outcome.graph_nodes()));
    }
    println!();

    Ok(())
}

/// Retrieve the memories closest to a query.
pub async fn retrieve(
    state: &AppState,
    namespace: &str,
    query: &str,
    n_results: Option<usize>,
    json: bool,
) -> Result<()> {
    let engine = state.engine(namespace)?;
    let n = n_results.unwrap_or(state.config.default_n_results);
    let matches = engine.retrieve(query, n).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!();
        println!(
            "  {} No memories in '{}' yet.",
            style("i").blue().bold(),
            style(namespace).cyan(),
        );
        println!();
        return Ok(());
    }

    for (rank, m) in matches.iter().enumerate() {
        print_match(rank + 1, m);
    }
    println!(
        "  {} match{}",
        style(matches.len()).bold(),
        if matches.len() == 1 { "" } else { "es" }
    );
    println!();

    Ok(())
}

/// Show a node, or its neighborhood when `depth > 0`.
pub async fn lookup(
    state: &AppState,
    namespace: &str,
    node_id: &str,
    depth: usize,
    json: bool,
) -> Result<()> {
    let engine = state.engine(namespace)?;
    let views = engine.expand(node_id, depth).await?;

    if json {
        let out = if depth == 0 {
            serde_json::to_value(views.first())?
        } else {
            serde_json::json!({ "nodes": views })
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    for view in &views {
        print_node(view);
    }
    if depth > 0 {
        println!(
            "  {} node{} within {} hop{}",
            style(views.len()).bold(),
            if views.len() == 1 { "" } else { "s" },
            depth,
            if depth == 1 { "" } else { "s" },
        );
        println!();
    }

    Ok(())
}

fn print_match(rank: usize, m: &RetrievalMatch) {
    println!();
    println!(
        "  {} {}  {}",
        style(format!("#{rank}")).dim(),
        style(&m.memory_id).bold(),
        style(format!("similarity {:.3}", m.similarity_score)).green(),
    );

    let metadata: Vec<(&String, &Value)> = m
        .metadata
        .iter()
        .filter(|(k, _)| k.as_str() != kappa_types::memory::GRAPH_NODES_KEY)
        .collect();
    if !metadata.is_empty() {
        let mut table = new_table(&["Key", "Value"]);
        for (key, value) in metadata {
            table.add_row(vec![
                Cell::new(key).fg(Color::Cyan),
                Cell::new(display_value(value)).fg(Color::White),
            ]);
        }
        println!("{table}");
    }

    for (alias, view) in &m.graph_context {
        println!(
            "    {} {} ({}) out:{} in:{}",
            style(alias).magenta(),
            style(&view.id).bold(),
            view.node_type,
            view.neighbors.outgoing.len(),
            view.neighbors.incoming.len(),
        );
    }
    println!();
}

fn print_node(view: &NodeView) {
    println!(
        "  {} {}",
        style(&view.id).cyan().bold(),
        style(format!("({})", view.node_type)).dim(),
    );

    if !view.attributes.is_empty() {
        let mut table = new_table(&["Attribute", "Value"]);
        for (name, value) in &view.attributes {
            table.add_row(vec![
                Cell::new(name).fg(Color::White),
                Cell::new(display_value(value)).fg(Color::White),
            ]);
        }
        println!("{table}");
    }

    if view.neighbors.is_empty() {
        println!("  {}", style("no edges").dim());
    } else {
        let mut table = new_table(&["Direction", "Label", "Node", "Type"]);
        for n in &view.neighbors.outgoing {
            table.add_row(vec![
                Cell::new("→ out").fg(Color::Green),
                Cell::new(&n.label).fg(Color::Yellow),
                Cell::new(&n.id).fg(Color::White),
                Cell::new(&n.node_type).fg(Color::DarkGrey),
            ]);
        }
        for n in &view.neighbors.incoming {
            table.add_row(vec![
                Cell::new("← in").fg(Color::Blue),
                Cell::new(&n.label).fg(Color::Yellow),
                Cell::new(&n.id).fg(Color::White),
                Cell::new(&n.node_type).fg(Color::DarkGrey),
            ]);
        }
        println!("{table}");
    }
    println!();
}

fn alias_table(graph_nodes: &BTreeMap<String, String>) -> Table {
    let mut table = new_table(&["Alias", "Node"]);
    for (alias, id) in graph_nodes {
        table.add_row(vec![
            Cell::new(alias).fg(Color::Magenta),
            Cell::new(id).fg(Color::White),
        ]);
    }
    table
}

pub(crate) fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.iter().map(|h| Cell::new(h).fg(Color::White)).collect::<Vec<_>>());
    table
}

/// Strings bare, everything else as compact JSON, truncated for tables.
fn display_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > 60 {
        format!("{}...", text.chars().take(57).collect::<String>())
    } else {
        text
    }
}
