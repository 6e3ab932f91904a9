//! Process-local vector index.
//!
//! Brute-force cosine search over a `Vec`. Used for the `memory` backend and
//! in tests; contents vanish with the process.

use kappa_core::memory::vector::VectorIndex;
use kappa_types::error::RepositoryError;
use kappa_types::memory::{VectorHit, VectorRecord};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    records: RwLock<Vec<VectorRecord>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine distance in `[0, 2]`; a zero vector is orthogonal to everything.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    (1.0 - dot / (norm_a * norm_b)).clamp(0.0, 2.0)
}

impl VectorIndex for InMemoryVectorIndex {
    async fn add(&self, records: &[VectorRecord]) -> Result<(), RepositoryError> {
        self.records.write().await.extend_from_slice(records);
        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<VectorHit>, RepositoryError> {
        let records = self.records.read().await;
        let mut hits: Vec<VectorHit> = records
            .iter()
            .map(|record| VectorHit {
                id: record.id.clone(),
                metadata: record.metadata.clone(),
                distance: cosine_distance(embedding, &record.embedding),
            })
            .collect();
        // Stable sort: equal distances keep insertion order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(n_results);
        Ok(hits)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.records.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kappa_types::memory::Metadata;

    fn record(id: &str, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            embedding,
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn test_cosine_distance_range() {
        assert!(cosine_distance(&[1.0, 0.0], &[2.0, 0.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[tokio::test]
    async fn test_query_ranks_by_distance() {
        let index = InMemoryVectorIndex::new();
        index
            .add(&[
                record("far", vec![-1.0, 0.0]),
                record("near", vec![1.0, 0.1]),
                record("mid", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = index.query(&[1.0, 0.0], 2).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert_eq!(index.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_index() {
        let index = InMemoryVectorIndex::new();
        assert!(index.query(&[1.0], 5).await.unwrap().is_empty());
        assert_eq!(index.count().await.unwrap(), 0);
    }
}
