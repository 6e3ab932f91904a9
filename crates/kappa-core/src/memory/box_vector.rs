//! BoxVectorIndex -- object-safe dynamic dispatch wrapper for VectorIndex.
//!
//! Same blanket-impl pattern as [`super::box_embedder`].

use std::future::Future;
use std::pin::Pin;

use kappa_types::error::RepositoryError;
use kappa_types::memory::{VectorHit, VectorRecord};

use super::vector::VectorIndex;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Object-safe version of [`VectorIndex`] with boxed futures.
pub trait VectorIndexDyn: Send + Sync {
    fn add_boxed<'a>(&'a self, records: &'a [VectorRecord]) -> BoxFuture<'a, ()>;

    fn query_boxed<'a>(&'a self, embedding: &'a [f32], n_results: usize)
    -> BoxFuture<'a, Vec<VectorHit>>;

    fn count_boxed(&self) -> BoxFuture<'_, u64>;
}

impl<T: VectorIndex> VectorIndexDyn for T {
    fn add_boxed<'a>(&'a self, records: &'a [VectorRecord]) -> BoxFuture<'a, ()> {
        Box::pin(self.add(records))
    }

    fn query_boxed<'a>(
        &'a self,
        embedding: &'a [f32],
        n_results: usize,
    ) -> BoxFuture<'a, Vec<VectorHit>> {
        Box::pin(self.query(embedding, n_results))
    }

    fn count_boxed(&self) -> BoxFuture<'_, u64> {
        Box::pin(self.count())
    }
}

/// Type-erased vector index for runtime backend selection.
pub struct BoxVectorIndex {
    inner: Box<dyn VectorIndexDyn + Send + Sync>,
}

impl BoxVectorIndex {
    pub fn new<T: VectorIndex + 'static>(index: T) -> Self {
        Self {
            inner: Box::new(index),
        }
    }
}

impl VectorIndex for BoxVectorIndex {
    async fn add(&self, records: &[VectorRecord]) -> Result<(), RepositoryError> {
        self.inner.add_boxed(records).await
    }

    async fn query(
        &self,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<VectorHit>, RepositoryError> {
        self.inner.query_boxed(embedding, n_results).await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.inner.count_boxed().await
    }
}

impl std::fmt::Debug for BoxVectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxVectorIndex").finish_non_exhaustive()
    }
}
