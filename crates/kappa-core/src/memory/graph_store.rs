//! Graph persistence trait.
//!
//! One snapshot per namespace, rewritten wholly on every mutating call.
//! Several processes may open the same namespace, so writers take the store
//! lock and reload the snapshot before mutating it. The file adapter lives in
//! kappa-infra.

use kappa_types::error::RepositoryError;
use kappa_types::graph::GraphSnapshot;

pub trait GraphPersistence: Send + Sync {
    /// Exclusive hold on the stored snapshot; dropping it releases the store.
    type Lock: Send;

    /// Wait for exclusive access to the stored snapshot.
    ///
    /// The lock must exclude writers in other processes, not only other
    /// tasks in this one.
    fn lock(&self) -> impl std::future::Future<Output = Result<Self::Lock, RepositoryError>> + Send;

    /// Load the stored snapshot; an absent store yields an empty graph.
    fn load(&self) -> impl std::future::Future<Output = Result<GraphSnapshot, RepositoryError>> + Send;

    /// Replace the stored snapshot durably. Readers see either the old or the
    /// new snapshot, never a partial one.
    fn save(
        &self,
        snapshot: &GraphSnapshot,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
