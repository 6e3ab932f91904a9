//! Vector index trait.
//!
//! Implementations (LanceDB, in-memory) live in kappa-infra. Every
//! implementation reports cosine distance in `[0, 2]`.

use kappa_types::error::RepositoryError;
use kappa_types::memory::{VectorHit, VectorRecord};

/// Nearest-neighbor index over one namespace collection.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait VectorIndex: Send + Sync {
    /// Append records. Ids are never rewritten.
    fn add(
        &self,
        records: &[VectorRecord],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Up to `n_results` hits, closest first.
    fn query(
        &self,
        embedding: &[f32],
        n_results: usize,
    ) -> impl std::future::Future<Output = Result<Vec<VectorHit>, RepositoryError>> + Send;

    /// Number of stored records.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}

/// Map a cosine distance onto `[0, 1]`: `clamp(1 - distance / 2, 0, 1)`.
pub fn distance_to_similarity(distance: f32) -> f32 {
    if distance.is_nan() {
        return 0.0;
    }
    (1.0 - distance / 2.0).clamp(0.0, 1.0)
}
