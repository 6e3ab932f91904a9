//! Graph persistence adapters.

pub mod file;
