//! Agent-facing tool descriptors for a memory namespace.
//!
//! Each namespace exposes `{namespace}_retrieve`, `{namespace}_ingest` and
//! `{namespace}_lookup`. Tool calls take and return JSON and never fail:
//! every error becomes `{"error": "..."}` so the calling agent can recover.

use std::collections::BTreeMap;
use std::sync::Arc;

use kappa_types::memory::{IngestArgs, LookupArgs, RetrieveArgs};
use schemars::{JsonSchema, schema_for};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::embedder::Embedder;
use super::engine::MemoryEngine;
use super::graph_store::GraphPersistence;
use super::vector::VectorIndex;

/// The three tools every namespace provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ToolKind {
    Retrieve,
    Ingest,
    Lookup,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Retrieve, ToolKind::Ingest, ToolKind::Lookup];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Retrieve => "retrieve",
            ToolKind::Ingest => "ingest",
            ToolKind::Lookup => "lookup",
        }
    }
}

/// Name, description and JSON-schema parameters of one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Tool factory bound to one namespace engine.
pub struct MemoryTools<E, V, P> {
    engine: Arc<MemoryEngine<E, V, P>>,
    names: BTreeMap<ToolKind, String>,
    default_n_results: usize,
}

impl<E, V, P> MemoryTools<E, V, P>
where
    E: Embedder,
    V: VectorIndex,
    P: GraphPersistence,
{
    pub fn for_engine(engine: Arc<MemoryEngine<E, V, P>>) -> Self {
        let names = ToolKind::ALL
            .iter()
            .map(|kind| (*kind, format!("{}_{}", engine.namespace(), kind.as_str())))
            .collect();
        Self {
            engine,
            names,
            default_n_results: 1,
        }
    }

    /// Replace the default `{namespace}_{kind}` name of one tool.
    pub fn with_name(mut self, kind: ToolKind, name: impl Into<String>) -> Self {
        self.names.insert(kind, name.into());
        self
    }

    /// Matches returned by the retrieve tool when `n_results` is omitted.
    pub fn with_default_n_results(mut self, n: usize) -> Self {
        self.default_n_results = n.max(1);
        self
    }

    pub fn name(&self, kind: ToolKind) -> &str {
        self.names.get(&kind).map(String::as_str).unwrap_or_default()
    }

    /// Map a tool name back to its kind.
    pub fn resolve(&self, name: &str) -> Option<ToolKind> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(kind, _)| *kind)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        ToolKind::ALL.iter().map(|kind| self.definition(*kind)).collect()
    }

    pub fn definition(&self, kind: ToolKind) -> ToolDefinition {
        let namespace = self.engine.namespace();
        let (description, parameters) = match kind {
            ToolKind::Retrieve => (
                format!("Used to retrieve {namespace} memory entries relevant to the task description."),
                parameters::<RetrieveArgs>(),
            ),
            ToolKind::Ingest => {
                let mut parameters = parameters::<IngestArgs>();
                let names = self.engine.registry().names();
                if let Some(ingestor) = parameters
                    .pointer_mut("/properties/ingestor")
                    .and_then(Value::as_object_mut)
                {
                    ingestor.insert("enum".to_string(), json!(names));
                }
                (
                    format!("Save {namespace} memory for domain specific purposes."),
                    parameters,
                )
            }
            ToolKind::Lookup => (
                format!("Look up a {namespace} memory graph node and its neighbors by id."),
                parameters::<LookupArgs>(),
            ),
        };

        ToolDefinition {
            name: self.name(kind).to_string(),
            description,
            parameters,
        }
    }

    /// Invoke a tool by name.
    pub async fn call(&self, name: &str, args: Value) -> Value {
        match self.resolve(name) {
            Some(kind) => self.invoke(kind, args).await,
            None => error(format!("unknown tool '{name}'")),
        }
    }

    /// Invoke a tool with raw JSON arguments.
    #[tracing::instrument(name = "memory_tool", skip(self, args), fields(tool = kind.as_str()))]
    pub async fn invoke(&self, kind: ToolKind, args: Value) -> Value {
        match kind {
            ToolKind::Retrieve => {
                let args: RetrieveArgs = match parse(args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                let n = args.n_results.unwrap_or(self.default_n_results);
                match self.engine.retrieve(&args.new_task_description, n).await {
                    Ok(matches) => json!({ "matches": matches }),
                    Err(e) => error(e),
                }
            }
            ToolKind::Ingest => {
                let args: IngestArgs = match parse(args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                let payload = Value::Object(args.payload);
                match self.engine.ingest(&args.ingestor, &payload).await {
                    Ok(outcome) => json!({
                        "status": "success",
                        "memory_id": outcome.memory_id(),
                        "graph_nodes": outcome.graph_nodes(),
                    }),
                    Err(e) => error(e),
                }
            }
            ToolKind::Lookup => {
                let args: LookupArgs = match parse(args) {
                    Ok(args) => args,
                    Err(e) => return e,
                };
                match args.depth.unwrap_or(0) {
                    0 => match self.engine.lookup(&args.node_id).await {
                        Ok(view) => json!(view),
                        Err(e) => error(e),
                    },
                    depth => match self.engine.expand(&args.node_id, depth).await {
                        Ok(views) => json!({ "nodes": views }),
                        Err(e) => error(e),
                    },
                }
            }
        }
    }
}

fn parameters<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_default()
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, Value> {
    serde_json::from_value(args).map_err(|e| error(format!("invalid arguments: {e}")))
}

fn error(message: impl std::fmt::Display) -> Value {
    json!({ "error": message.to_string() })
}
