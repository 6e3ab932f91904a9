//! MemoryEngine -- hybrid vector/graph memory for one namespace.
//!
//! An ingest projects the payload through its ingestor, mutates the graph,
//! persists it, and only then writes the vector record whose `graph_nodes`
//! metadata points at the new nodes. Retrieval runs the vector query and
//! expands every referenced node from the in-memory graph.
//!
//! Writers in this process are serialized by `write_lock`; writers in other
//! processes by the persistence lock, under which the stored graph is
//! reloaded before every mutation. The in-memory graph sits behind a
//! `RwLock` so lookups and retrievals never wait on an embedding call.

use std::collections::BTreeMap;

use kappa_types::error::{MemoryError, RepositoryError};
use kappa_types::graph::NodeView;
use kappa_types::ingestor::IngestorSpec;
use kappa_types::memory::{
    GRAPH_NODES_KEY, IngestOutcome, MemoryStats, Metadata, RetrievalMatch, VectorRecord,
    new_memory_id,
};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use super::embedder::Embedder;
use super::graph::PropertyGraph;
use super::graph_store::GraphPersistence;
use super::mutator::mutate;
use super::path::scalar_id;
use super::projector::{project_metadata, project_text};
use super::schema::SchemaRegistry;
use super::vector::{VectorIndex, distance_to_similarity};

pub struct MemoryEngine<E, V, P> {
    registry: SchemaRegistry,
    embedder: E,
    index: V,
    persistence: P,
    graph: RwLock<PropertyGraph>,
    write_lock: Mutex<()>,
}

impl<E, V, P> MemoryEngine<E, V, P>
where
    E: Embedder,
    V: VectorIndex,
    P: GraphPersistence,
{
    /// Open a namespace: load its graph snapshot and wire the adapters.
    pub async fn open(
        registry: SchemaRegistry,
        embedder: E,
        index: V,
        persistence: P,
    ) -> Result<Self, MemoryError> {
        let snapshot = persistence
            .load()
            .await
            .map_err(|e| MemoryError::GraphPersistence(e.to_string()))?;
        let graph = PropertyGraph::from_snapshot(snapshot);

        tracing::info!(
            namespace = registry.namespace(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            ingestors = registry.names().len(),
            "memory namespace opened"
        );

        Ok(Self {
            registry,
            embedder,
            index,
            persistence,
            graph: RwLock::new(graph),
            write_lock: Mutex::new(()),
        })
    }

    pub fn namespace(&self) -> &str {
        self.registry.namespace()
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Remember `payload` using the named ingestor.
    ///
    /// The graph is persisted before the vector record is written. When no
    /// text field resolves the call stops after the graph write and reports
    /// a graph-only entry.
    #[tracing::instrument(
        name = "memory_ingest",
        skip(self, payload),
        fields(namespace = %self.registry.namespace())
    )]
    pub async fn ingest(
        &self,
        ingestor: &str,
        payload: &Value,
    ) -> Result<IngestOutcome, MemoryError> {
        let spec = self
            .registry
            .get(ingestor)
            .ok_or_else(|| MemoryError::UnknownIngestor {
                namespace: self.namespace().to_string(),
                ingestor: ingestor.to_string(),
            })?;

        let _writer = self.write_lock.lock().await;
        let graph_nodes = self.write_graph(spec, payload).await?;

        let text = project_text(spec, payload);
        if text.is_empty() {
            tracing::debug!(nodes = graph_nodes.len(), "no text resolved, graph-only entry");
            return Ok(IngestOutcome::GraphOnly { graph_nodes });
        }

        let mut metadata = project_metadata(spec, payload, self.namespace());
        metadata.insert(
            GRAPH_NODES_KEY.to_string(),
            Value::String(encode_graph_nodes(&graph_nodes)),
        );

        let embedding = self
            .embedder
            .embed_query(&text)
            .await
            .map_err(|e| MemoryError::Embedding(e.to_string()))?;

        let memory_id = new_memory_id(self.namespace());
        let record = VectorRecord {
            id: memory_id.clone(),
            embedding,
            metadata,
        };
        self.index
            .add(std::slice::from_ref(&record))
            .await
            .map_err(|e| MemoryError::VectorIndex(e.to_string()))?;

        tracing::debug!(%memory_id, nodes = graph_nodes.len(), "memory stored");
        Ok(IngestOutcome::Stored {
            memory_id,
            graph_nodes,
        })
    }

    /// Apply the ingestor's graph spec under the store lock.
    ///
    /// Other processes may have written since this engine was opened, so the
    /// stored snapshot is reloaded first. The mutation runs on that fresh
    /// copy; a failed save leaves memory and disk in agreement.
    async fn write_graph(
        &self,
        spec: &IngestorSpec,
        payload: &Value,
    ) -> Result<BTreeMap<String, String>, MemoryError> {
        let persistence_err = |e: RepositoryError| MemoryError::GraphPersistence(e.to_string());

        let _store = self.persistence.lock().await.map_err(persistence_err)?;
        let snapshot = self.persistence.load().await.map_err(persistence_err)?;
        let mut next = PropertyGraph::from_snapshot(snapshot);
        let graph_nodes = mutate(&mut next, &spec.graph, payload);
        self.persistence
            .save(&next.to_snapshot())
            .await
            .map_err(persistence_err)?;
        *self.graph.write().await = next;

        Ok(graph_nodes)
    }

    /// Nearest memories to `query`, each fused with the graph context of the
    /// nodes it references. `n_results == 0` is treated as 1.
    #[tracing::instrument(
        name = "memory_retrieve",
        skip(self, query),
        fields(namespace = %self.registry.namespace())
    )]
    pub async fn retrieve(
        &self,
        query: &str,
        n_results: usize,
    ) -> Result<Vec<RetrievalMatch>, MemoryError> {
        let embedding = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|e| MemoryError::Embedding(e.to_string()))?;

        let hits = self
            .index
            .query(&embedding, n_results.max(1))
            .await
            .map_err(|e| MemoryError::VectorIndex(e.to_string()))?;

        let graph = self.graph.read().await;
        let matches = hits
            .into_iter()
            .map(|hit| {
                let graph_context = decode_graph_nodes(&hit.id, &hit.metadata)
                    .into_iter()
                    .filter_map(|(alias, id)| graph.view(&id).map(|view| (alias, view)))
                    .collect();
                RetrievalMatch {
                    similarity_score: distance_to_similarity(hit.distance),
                    distance: hit.distance,
                    memory_id: hit.id,
                    metadata: hit.metadata,
                    graph_context,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(matches = matches.len(), "retrieval complete");
        Ok(matches)
    }

    /// A node with its outgoing and incoming neighbors.
    pub async fn lookup(&self, node_id: &str) -> Result<NodeView, MemoryError> {
        self.graph
            .read()
            .await
            .view(node_id)
            .ok_or_else(|| MemoryError::NodeNotFound(node_id.to_string()))
    }

    /// Breadth-first neighborhood of `node_id` up to `depth` hops, start node
    /// first. `depth == 0` is a lookup.
    pub async fn expand(&self, node_id: &str, depth: usize) -> Result<Vec<NodeView>, MemoryError> {
        let views = self.graph.read().await.neighborhood(node_id, depth);
        if views.is_empty() {
            return Err(MemoryError::NodeNotFound(node_id.to_string()));
        }
        Ok(views)
    }

    pub async fn stats(&self) -> Result<MemoryStats, MemoryError> {
        let (nodes, edges) = {
            let graph = self.graph.read().await;
            (graph.node_count(), graph.edge_count())
        };
        let vectors = self
            .index
            .count()
            .await
            .map_err(|e| MemoryError::VectorIndex(e.to_string()))?;
        Ok(MemoryStats {
            nodes,
            edges,
            vectors,
        })
    }
}

fn encode_graph_nodes(graph_nodes: &BTreeMap<String, String>) -> String {
    let map: serde_json::Map<String, Value> = graph_nodes
        .iter()
        .map(|(alias, id)| (alias.clone(), Value::String(id.clone())))
        .collect();
    Value::Object(map).to_string()
}

/// Alias -> node id map stored on a vector record.
///
/// Accepts the serialized string form and a plain object; anything else
/// degrades to an empty map.
fn decode_graph_nodes(memory_id: &str, metadata: &Metadata) -> BTreeMap<String, String> {
    let decoded = match metadata.get(GRAPH_NODES_KEY) {
        None => return BTreeMap::new(),
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw).ok(),
        Some(value) => Some(value.clone()),
    };

    match decoded {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(alias, id)| scalar_id(id).map(|id| (alias.clone(), id)))
            .collect(),
        _ => {
            tracing::warn!(%memory_id, "undecodable graph_nodes metadata, ignoring graph context");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::sync::Arc;

    use kappa_types::graph::{GraphNode, GraphSnapshot};
    use kappa_types::memory::{GRAPH_ONLY_SENTINEL, NAMESPACE_KEY, VectorHit};
    use serde_json::json;

    use super::*;

    const DIM: usize = 64;

    /// Bag-of-tokens hashing embedder: identical text, identical vector.
    struct StubEmbedder;

    impl Embedder for StubEmbedder {
        async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RepositoryError> {
            let mut v = vec![0.0f32; DIM];
            for token in text.split_whitespace() {
                let mut h = DefaultHasher::new();
                token.to_lowercase().hash(&mut h);
                v[(h.finish() % DIM as u64) as usize] += 1.0;
            }
            Ok(v)
        }

        fn model_name(&self) -> &str {
            "stub"
        }

        fn dimension(&self) -> usize {
            DIM
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>, RepositoryError> {
            Err(RepositoryError::Query("model unavailable".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }

        fn dimension(&self) -> usize {
            DIM
        }
    }

    #[derive(Default, Clone)]
    struct StubIndex {
        records: Arc<std::sync::Mutex<Vec<VectorRecord>>>,
        raw_hits: Option<Vec<VectorHit>>,
    }

    fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if na == 0.0 || nb == 0.0 {
            return 1.0;
        }
        1.0 - dot / (na * nb)
    }

    impl VectorIndex for StubIndex {
        async fn add(&self, records: &[VectorRecord]) -> Result<(), RepositoryError> {
            self.records.lock().unwrap().extend_from_slice(records);
            Ok(())
        }

        async fn query(
            &self,
            embedding: &[f32],
            n_results: usize,
        ) -> Result<Vec<VectorHit>, RepositoryError> {
            if let Some(hits) = &self.raw_hits {
                return Ok(hits.clone());
            }
            let records = self.records.lock().unwrap();
            let mut hits: Vec<VectorHit> = records
                .iter()
                .map(|r| VectorHit {
                    id: r.id.clone(),
                    metadata: r.metadata.clone(),
                    distance: cosine_distance(embedding, &r.embedding),
                })
                .collect();
            hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
            hits.truncate(n_results);
            Ok(hits)
        }

        async fn count(&self) -> Result<u64, RepositoryError> {
            Ok(self.records.lock().unwrap().len() as u64)
        }
    }

    #[derive(Default, Clone)]
    struct StubPersistence {
        saved: Arc<std::sync::Mutex<Option<GraphSnapshot>>>,
        store_lock: Arc<Mutex<()>>,
        fail_saves: bool,
    }

    impl GraphPersistence for StubPersistence {
        type Lock = tokio::sync::OwnedMutexGuard<()>;

        async fn lock(&self) -> Result<Self::Lock, RepositoryError> {
            Ok(Arc::clone(&self.store_lock).lock_owned().await)
        }

        async fn load(&self) -> Result<GraphSnapshot, RepositoryError> {
            Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
        }

        async fn save(&self, snapshot: &GraphSnapshot) -> Result<(), RepositoryError> {
            if self.fail_saves {
                return Err(RepositoryError::Io("disk full".to_string()));
            }
            *self.saved.lock().unwrap() = Some(snapshot.clone());
            Ok(())
        }
    }

    const INGESTORS: &str = r#"
ingestors:
  api_doc:
    text_fields: [endpoint.name, endpoint.description]
    metadata:
      section: section.name
    graph:
      nodes:
        - { id: tool, key: endpoint.name, type: tool, attributes: { description: endpoint.description } }
  learning_episode:
    text_fields: [episode.task]
    graph:
      nodes:
        - { id: episode, key: episode.id, type: Episode }
        - { id: failure, key: episode.failure, type: Failure }
      edges:
        - { label: HAD_FAILURE, source: episode, target: failure }
        - { label: USED, source: episode, target_key: episode.tools }
  concept:
    graph:
      nodes:
        - { id: concept, key: name, type: concept }
"#;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::compile("semantic", serde_yaml_ng::from_str(INGESTORS).unwrap()).unwrap()
    }

    async fn engine_with(
        index: StubIndex,
        persistence: StubPersistence,
    ) -> MemoryEngine<StubEmbedder, StubIndex, StubPersistence> {
        MemoryEngine::open(registry(), StubEmbedder, index, persistence)
            .await
            .unwrap()
    }

    async fn engine() -> MemoryEngine<StubEmbedder, StubIndex, StubPersistence> {
        engine_with(StubIndex::default(), StubPersistence::default()).await
    }

    fn rsi() -> Value {
        json!({
            "endpoint": {"name": "RSI", "description": "Relative Strength Index"},
            "section": {"name": "Indicators"}
        })
    }

    #[tokio::test]
    async fn test_ingest_then_retrieve_identical_text() {
        let engine = engine().await;
        let outcome = engine.ingest("api_doc", &rsi()).await.unwrap();

        let memory_id = outcome.memory_id().to_string();
        assert_ne!(memory_id, GRAPH_ONLY_SENTINEL);
        assert!(memory_id.starts_with("mem_semantic_"));

        let matches = engine
            .retrieve("RSI\nRelative Strength Index", 1)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].memory_id, memory_id);
        assert!(matches[0].similarity_score >= 0.99);
    }

    #[tokio::test]
    async fn test_api_doc_scenario() {
        let engine = engine().await;
        engine.ingest("api_doc", &rsi()).await.unwrap();

        let matches = engine.retrieve("RSI strength", 1).await.unwrap();
        let hit = &matches[0];
        assert_eq!(hit.metadata["section"], json!("Indicators"));
        assert_eq!(hit.metadata[NAMESPACE_KEY], json!("semantic"));

        let tool = &hit.graph_context["tool"];
        assert_eq!(tool.id, "RSI");
        assert_eq!(tool.node_type, "tool");
        assert_eq!(tool.attributes["description"], json!("Relative Strength Index"));
        assert!(tool.neighbors.outgoing.is_empty());
        assert!(tool.neighbors.incoming.is_empty());
    }

    #[tokio::test]
    async fn test_two_ingests_get_distinct_ids_and_upsert_node() {
        let engine = engine().await;
        let a = engine.ingest("api_doc", &rsi()).await.unwrap();
        let b = engine.ingest("api_doc", &rsi()).await.unwrap();
        assert_ne!(a.memory_id(), b.memory_id());

        let stats = engine.stats().await.unwrap();
        assert_eq!(stats.nodes, 1);
        assert_eq!(stats.vectors, 2);
    }

    #[tokio::test]
    async fn test_graph_only_ingest_writes_no_vector() {
        let engine = engine().await;
        let outcome = engine.ingest("concept", &json!({"name": "momentum"})).await.unwrap();

        assert!(outcome.is_graph_only());
        assert_eq!(outcome.memory_id(), GRAPH_ONLY_SENTINEL);
        assert_eq!(outcome.graph_nodes()["concept"], "momentum");

        let stats = engine.stats().await.unwrap();
        assert_eq!(stats.vectors, 0);
        assert_eq!(stats.nodes, 1);
        assert_eq!(engine.lookup("momentum").await.unwrap().node_type, "concept");
    }

    #[tokio::test]
    async fn test_unknown_ingestor_is_an_error() {
        let engine = engine().await;
        let err = engine.ingest("nope", &json!({})).await.unwrap_err();
        assert!(matches!(err, MemoryError::UnknownIngestor { ref ingestor, .. } if ingestor == "nope"));
        assert_eq!(engine.stats().await.unwrap(), MemoryStats::default());
    }

    #[tokio::test]
    async fn test_missing_endpoint_edge_is_dropped() {
        let engine = engine().await;
        let before = engine.stats().await.unwrap().edges;
        engine
            .ingest(
                "learning_episode",
                &json!({"episode": {"id": "ep1", "task": "compute RSI", "failure": null}}),
            )
            .await
            .unwrap();
        assert_eq!(engine.stats().await.unwrap().edges, before);
    }

    #[tokio::test]
    async fn test_fan_out_and_lookup_neighbors() {
        let engine = engine().await;
        for name in ["RSI", "MACD", "EMA"] {
            engine.ingest("concept", &json!({"name": name})).await.unwrap();
        }
        engine
            .ingest(
                "learning_episode",
                &json!({"episode": {
                    "id": "ep1",
                    "task": "momentum screen",
                    "failure": "timeout",
                    "tools": ["RSI", "MACD", "EMA", "VWAP"]
                }}),
            )
            .await
            .unwrap();

        let episode = engine.lookup("ep1").await.unwrap();
        let used: Vec<&str> = episode
            .neighbors
            .outgoing
            .iter()
            .filter(|n| n.label == "USED")
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(used, vec!["RSI", "MACD", "EMA"]);
        assert_eq!(engine.stats().await.unwrap().edges, 4);

        let rsi = engine.lookup("RSI").await.unwrap();
        assert_eq!(rsi.neighbors.incoming[0].id, "ep1");
        assert_eq!(rsi.neighbors.incoming[0].node_type, "Episode");

        let reached = engine.expand("RSI", 2).await.unwrap();
        assert_eq!(reached[0].id, "RSI");
        assert_eq!(reached.len(), 5);
    }

    #[tokio::test]
    async fn test_lookup_and_expand_unknown_node() {
        let engine = engine().await;
        assert!(matches!(
            engine.lookup("ghost").await.unwrap_err(),
            MemoryError::NodeNotFound(id) if id == "ghost"
        ));
        assert!(engine.expand("ghost", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_graph_survives_reopen() {
        let persistence = StubPersistence::default();
        let engine = engine_with(StubIndex::default(), persistence.clone()).await;
        engine.ingest("api_doc", &rsi()).await.unwrap();
        drop(engine);

        let reopened = engine_with(StubIndex::default(), persistence).await;
        assert_eq!(reopened.lookup("RSI").await.unwrap().node_type, "tool");
    }

    #[tokio::test]
    async fn test_second_engine_on_same_store_keeps_first_writers_nodes() {
        let persistence = StubPersistence::default();
        let a = engine_with(StubIndex::default(), persistence.clone()).await;
        let b = engine_with(StubIndex::default(), persistence.clone()).await;

        a.ingest("concept", &json!({"name": "RSI"})).await.unwrap();
        b.ingest("concept", &json!({"name": "MACD"})).await.unwrap();

        let stored = persistence.saved.lock().unwrap().clone().unwrap();
        let ids: Vec<&str> = stored.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["RSI", "MACD"]);
        assert!(b.lookup("RSI").await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ingests_keep_every_node() {
        const N: usize = 16;
        let index = StubIndex::default();
        let persistence = StubPersistence::default();
        let engine = Arc::new(engine_with(index.clone(), persistence.clone()).await);

        let tasks: Vec<_> = (0..N)
            .map(|i| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    let payload = json!({"endpoint": {"name": format!("tool-{i}"), "description": "indicator"}});
                    engine.ingest("api_doc", &payload).await.unwrap()
                })
            })
            .collect();
        for task in tasks {
            assert!(!task.await.unwrap().is_graph_only());
        }

        let stats = engine.stats().await.unwrap();
        assert_eq!(stats.nodes, N);
        assert_eq!(stats.vectors, N as u64);

        let stored = persistence.saved.lock().unwrap().clone().unwrap();
        assert_eq!(stored.nodes.len(), N);

        let records = index.records.lock().unwrap().clone();
        assert_eq!(records.len(), N);
        for record in &records {
            let graph_nodes = decode_graph_nodes(&record.id, &record.metadata);
            assert_eq!(graph_nodes.len(), 1);
            for id in graph_nodes.values() {
                assert_eq!(engine.lookup(id).await.unwrap().node_type, "tool");
            }
        }
    }

    #[tokio::test]
    async fn test_failed_save_leaves_graph_and_index_untouched() {
        let persistence = StubPersistence {
            fail_saves: true,
            ..Default::default()
        };
        let engine = engine_with(StubIndex::default(), persistence).await;
        let err = engine.ingest("api_doc", &rsi()).await.unwrap_err();

        assert!(matches!(err, MemoryError::GraphPersistence(_)));
        assert_eq!(engine.stats().await.unwrap(), MemoryStats::default());
    }

    #[tokio::test]
    async fn test_embedding_failure_is_reported_after_graph_write() {
        let persistence = StubPersistence::default();
        let engine = MemoryEngine::open(
            registry(),
            FailingEmbedder,
            StubIndex::default(),
            persistence.clone(),
        )
        .await
        .unwrap();

        let err = engine.ingest("api_doc", &rsi()).await.unwrap_err();
        assert!(matches!(err, MemoryError::Embedding(_)));
        assert!(engine.lookup("RSI").await.is_ok());
        assert!(engine.retrieve("RSI", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_retrieve_zero_results_means_one() {
        let engine = engine().await;
        engine.ingest("api_doc", &rsi()).await.unwrap();
        engine
            .ingest("learning_episode", &json!({"episode": {"id": "ep1", "task": "RSI"}}))
            .await
            .unwrap();
        assert_eq!(engine.retrieve("RSI", 0).await.unwrap().len(), 1);
        assert_eq!(engine.retrieve("RSI", 5).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_retrieve_tolerates_odd_graph_nodes() {
        let hit = |id: &str, graph_nodes: Option<Value>, distance: f32| {
            let mut metadata = Metadata::new();
            if let Some(v) = graph_nodes {
                metadata.insert(GRAPH_NODES_KEY.to_string(), v);
            }
            VectorHit {
                id: id.to_string(),
                metadata,
                distance,
            }
        };
        let index = StubIndex {
            raw_hits: Some(vec![
                hit("object", Some(json!({"tool": "RSI", "gone": "deleted"})), 0.2),
                hit("garbage", Some(json!("{not json")), 1.0),
                hit("absent", None, 3.0),
            ]),
            ..Default::default()
        };
        let persistence = StubPersistence::default();
        *persistence.saved.lock().unwrap() = Some(GraphSnapshot {
            nodes: vec![GraphNode::new("RSI", "tool")],
            edges: vec![],
        });

        let engine = engine_with(index, persistence).await;
        let matches = engine.retrieve("anything", 3).await.unwrap();

        let ids: Vec<&str> = matches.iter().map(|m| m.memory_id.as_str()).collect();
        assert_eq!(ids, vec!["object", "garbage", "absent"]);
        assert_eq!(matches[0].graph_context.len(), 1);
        assert_eq!(matches[0].graph_context["tool"].id, "RSI");
        assert!(matches[1].graph_context.is_empty());
        assert!(matches[2].graph_context.is_empty());
        assert_eq!(matches[1].similarity_score, 0.5);
        assert_eq!(matches[2].similarity_score, 0.0);
    }

    #[test]
    fn test_graph_nodes_encoding_roundtrip() {
        let nodes = BTreeMap::from([("tool".to_string(), "RSI".to_string())]);
        let mut metadata = Metadata::new();
        metadata.insert(GRAPH_NODES_KEY.into(), Value::String(encode_graph_nodes(&nodes)));
        assert_eq!(decode_graph_nodes("m", &metadata), nodes);
    }
}
