//! Status command: data directory, backends and per-namespace counts.

use anyhow::Result;
use comfy_table::{Cell, Color};
use console::style;
use serde_json::json;

use kappa_core::memory::embedder::Embedder;

use super::memory::new_table;
use crate::state::AppState;

/// Show status information.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let backend = format!("{:?}", state.config.vector_backend).to_lowercase();
    let provider = format!("{:?}", state.config.embedding.provider).to_lowercase();

    let mut rows = Vec::new();
    for engine in state.engines() {
        let stats = engine.stats().await?;
        rows.push((
            engine.namespace().to_string(),
            engine.registry().collection_name(),
            engine.registry().names().len(),
            engine.embedder().model_name().to_string(),
            stats,
        ));
    }

    if json {
        let namespaces: Vec<_> = rows
            .iter()
            .map(|(name, collection, ingestors, model, stats)| {
                json!({
                    "name": name,
                    "collection": collection,
                    "ingestors": ingestors,
                    "model": model,
                    "nodes": stats.nodes,
                    "edges": stats.edges,
                    "vectors": stats.vectors,
                })
            })
            .collect();
        let out = json!({
            "version": version,
            "data_dir": state.data_dir.display().to_string(),
            "store_dir": state.store_dir.display().to_string(),
            "vector_backend": backend,
            "embedding": {
                "provider": provider,
                "model": state.config.embedding.model,
            },
            "namespaces": namespaces,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("kappa").cyan().bold(), style(format!("v{version}")).dim());
    println!();
    println!("  {:<14}{}", style("Data").dim(), state.data_dir.display());
    println!("  {:<14}{}", style("Store").dim(), state.store_dir.display());
    println!("  {:<14}{}", style("Vectors").dim(), backend);
    println!(
        "  {:<14}{} ({})",
        style("Embedding").dim(),
        state.config.embedding.model,
        provider
    );
    println!();

    if rows.is_empty() {
        println!(
            "  {} No namespaces configured. Add [[namespaces]] to kappa.toml.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = new_table(&["Namespace", "Collection", "Ingestors", "Nodes", "Edges", "Vectors"]);
    for (name, collection, ingestors, _, stats) in &rows {
        table.add_row(vec![
            Cell::new(name).fg(Color::Cyan),
            Cell::new(collection).fg(Color::DarkGrey),
            Cell::new(ingestors).fg(Color::White),
            Cell::new(stats.nodes).fg(Color::White),
            Cell::new(stats.edges).fg(Color::White),
            Cell::new(stats.vectors).fg(Color::Green),
        ]);
    }
    println!("{table}");
    println!();

    Ok(())
}
