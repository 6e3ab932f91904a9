//! Shared domain types for Kappa.
//!
//! This crate contains the types exchanged between the memory engine, its
//! storage adapters and the CLI host: ingestor schemas, graph nodes and
//! views, vector records, retrieval matches, configuration and errors.
//!
//! Zero infrastructure dependencies -- only serde, uuid, thiserror, schemars.

pub mod config;
pub mod error;
pub mod graph;
pub mod ingestor;
pub mod memory;
