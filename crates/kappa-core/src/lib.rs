//! Memory engine logic and capability trait definitions for Kappa.
//!
//! This crate defines the "ports" (embedder, vector index, graph persistence)
//! that the infrastructure layer implements, plus the engine that fuses them.
//! It depends only on `kappa-types` -- never on `kappa-infra` or any
//! database/IO crate.

pub mod memory;
