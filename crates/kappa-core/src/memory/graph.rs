//! In-memory property graph for one namespace.
//!
//! Nodes live in a `petgraph` arena and are addressed by their string id
//! through a side index, so cycles and back-references need no shared
//! ownership. The whole graph round-trips through `GraphSnapshot`.

use std::collections::{HashMap, HashSet, VecDeque};

use kappa_types::graph::{GraphEdge, GraphNode, GraphSnapshot, Neighbor, Neighbors, NodeView};
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

/// Directed property graph keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct PropertyGraph {
    graph: StableDiGraph<GraphNode, String>,
    index: HashMap<String, NodeIndex>,
}

impl PropertyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from its persisted form.
    ///
    /// Duplicate node ids are merged; edges whose endpoints are missing are
    /// dropped.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut graph = Self::new();
        for node in snapshot.nodes {
            graph.upsert_node(node);
        }
        for edge in snapshot.edges {
            if !graph.add_edge(&edge.source, &edge.target, &edge.label) {
                tracing::debug!(
                    source = %edge.source,
                    target = %edge.target,
                    label = %edge.label,
                    "dropping snapshot edge"
                );
            }
        }
        graph
    }

    /// Persisted form, nodes and edges in insertion order.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .graph
            .node_indices()
            .map(|idx| self.graph[idx].clone())
            .collect();
        let edges = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (source, target) = self.graph.edge_endpoints(e)?;
                Some(GraphEdge {
                    source: self.graph[source].id.clone(),
                    target: self.graph[target].id.clone(),
                    label: self.graph[e].clone(),
                })
            })
            .collect();
        GraphSnapshot { nodes, edges }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Create the node, or merge it into the existing node with the same id.
    ///
    /// Returns `true` when a new node was created.
    pub fn upsert_node(&mut self, node: GraphNode) -> bool {
        match self.index.get(&node.id) {
            Some(&idx) => {
                self.graph[idx].merge(node);
                false
            }
            None => {
                let id = node.id.clone();
                let idx = self.graph.add_node(node);
                self.index.insert(id, idx);
                true
            }
        }
    }

    /// Add `source -[label]-> target`.
    ///
    /// Returns `false` (and stores nothing) when either endpoint is missing
    /// or the exact triple already exists.
    pub fn add_edge(&mut self, source: &str, target: &str, label: &str) -> bool {
        let (Some(&src), Some(&dst)) = (self.index.get(source), self.index.get(target)) else {
            return false;
        };

        let exists = self
            .graph
            .edges_directed(src, Direction::Outgoing)
            .any(|e| e.target() == dst && e.weight() == label);
        if exists {
            return false;
        }

        self.graph.add_edge(src, dst, label.to_string());
        true
    }

    /// The node's attributes plus its outgoing and incoming neighbors.
    pub fn view(&self, id: &str) -> Option<NodeView> {
        let &idx = self.index.get(id)?;
        let node = &self.graph[idx];
        Some(NodeView {
            id: node.id.clone(),
            node_type: node.node_type.clone(),
            attributes: node.attributes.clone(),
            neighbors: Neighbors {
                outgoing: self.neighbors(idx, Direction::Outgoing),
                incoming: self.neighbors(idx, Direction::Incoming),
            },
        })
    }

    /// Breadth-first expansion over edges in both directions.
    ///
    /// Returns the start node first, then every node within `depth` hops,
    /// each reached node once. Empty when `id` is unknown.
    pub fn neighborhood(&self, id: &str, depth: usize) -> Vec<NodeView> {
        let Some(&start) = self.index.get(id) else {
            return Vec::new();
        };

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0usize)]);
        let mut views = Vec::new();

        while let Some((idx, hops)) = queue.pop_front() {
            if let Some(view) = self.view(&self.graph[idx].id) {
                views.push(view);
            }
            if hops == depth {
                continue;
            }
            let adjacent = self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .chain(self.graph.neighbors_directed(idx, Direction::Incoming));
            for next in adjacent {
                if visited.insert(next) {
                    queue.push_back((next, hops + 1));
                }
            }
        }

        views
    }

    fn neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<Neighbor> {
        // petgraph walks adjacency newest-first; reverse for insertion order.
        let mut neighbors: Vec<Neighbor> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                let node = &self.graph[other];
                Neighbor {
                    label: e.weight().clone(),
                    id: node.id.clone(),
                    node_type: node.node_type.clone(),
                }
            })
            .collect();
        neighbors.reverse();
        neighbors
    }
}
