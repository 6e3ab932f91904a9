//! Hybrid vector-graph memory.
//!
//! Ingestors (declarative schemas) project JSON payloads into text for the
//! vector index and into node/edge upserts for the namespace graph. The
//! engine fuses both at retrieval time by expanding every graph node a
//! vector hit references.

pub mod box_embedder;
pub mod box_vector;
pub mod embedder;
pub mod engine;
pub mod graph;
pub mod graph_store;
pub mod mutator;
pub mod path;
pub mod projector;
pub mod schema;
pub mod tool;
pub mod vector;
