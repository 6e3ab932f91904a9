//! Vector index and embedding infrastructure.
//!
//! Provides the LanceDB-backed index, an in-memory index for ephemeral runs,
//! and fastembed/hashing embedders. Arrow schemas define the table layout.

pub mod embedder;
pub mod in_memory;
pub mod lance;
pub mod memory;
pub mod schema;
