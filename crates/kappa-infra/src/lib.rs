//! Infrastructure layer for Kappa.
//!
//! Contains implementations of the capability traits defined in `kappa-core`:
//! LanceDB and in-memory vector indexes, fastembed and hashing embedders, the
//! JSON graph file, plus config and data-directory resolution.

pub mod config;
pub mod filesystem;
pub mod graph;
pub mod vector;
