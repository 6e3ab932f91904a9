//! LanceDB-backed vector index for one namespace collection.
//!
//! Implements `VectorIndex` from `kappa-core`. Records are appended to the
//! collection table; queries use cosine distance, so reported distances fall
//! in `[0, 2]`.

use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field};
use chrono::Utc;
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};

use kappa_core::memory::vector::VectorIndex;
use kappa_types::error::RepositoryError;
use kappa_types::memory::{Metadata, VectorHit, VectorRecord};

use super::lance::LanceVectorStore;
use super::schema::memory_record_schema;

pub struct LanceVectorIndex {
    store: LanceVectorStore,
    table_name: String,
    namespace: String,
    dimension: i32,
}

impl LanceVectorIndex {
    pub fn new(
        store: LanceVectorStore,
        table_name: impl Into<String>,
        namespace: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            store,
            table_name: table_name.into(),
            namespace: namespace.into(),
            dimension: dimension as i32,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn ensure_table(&self) -> Result<lancedb::Table, RepositoryError> {
        let schema = Arc::new(memory_record_schema(self.dimension));
        self.store
            .ensure_table(&self.table_name, schema)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to ensure collection table: {e}")))
    }

    async fn existing_table(&self) -> Result<Option<lancedb::Table>, RepositoryError> {
        self.store
            .open_table(&self.table_name)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to open collection table: {e}")))
    }

    /// Build one Arrow RecordBatch holding every record.
    fn build_record_batch(&self, records: &[VectorRecord]) -> Result<RecordBatch, RepositoryError> {
        let schema = Arc::new(memory_record_schema(self.dimension));
        let created_at = Utc::now().to_rfc3339();

        let mut values = Vec::with_capacity(records.len() * self.dimension as usize);
        let mut metadata = Vec::with_capacity(records.len());
        for record in records {
            if record.embedding.len() != self.dimension as usize {
                return Err(RepositoryError::Query(format!(
                    "embedding for {} has {} dimensions, collection expects {}",
                    record.id,
                    record.embedding.len(),
                    self.dimension
                )));
            }
            values.extend_from_slice(&record.embedding);
            metadata.push(
                serde_json::to_string(&record.metadata)
                    .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
            );
        }

        let id_array = StringArray::from_iter_values(records.iter().map(|r| r.id.as_str()));
        let namespace_array =
            StringArray::from_iter_values(records.iter().map(|_| self.namespace.as_str()));
        let metadata_array = StringArray::from(metadata);
        let created_at_array =
            StringArray::from_iter_values(records.iter().map(|_| created_at.as_str()));

        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let vector_array = FixedSizeListArray::try_new(
            field,
            self.dimension,
            Arc::new(Float32Array::from(values)),
            None,
        )
        .map_err(|e| RepositoryError::Query(format!("Failed to build vector column: {e}")))?;

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(id_array),
                Arc::new(namespace_array),
                Arc::new(metadata_array),
                Arc::new(created_at_array),
                Arc::new(vector_array),
            ],
        )
        .map_err(|e| RepositoryError::Query(format!("Failed to build record batch: {e}")))
    }

    /// Parse search result rows into hits.
    fn batch_to_hits(batch: &RecordBatch) -> Result<Vec<VectorHit>, RepositoryError> {
        let column = |name: &str| {
            batch
                .column_by_name(name)
                .ok_or_else(|| RepositoryError::Serialization(format!("missing column {name}")))
        };
        let id_col = column("id")?
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| RepositoryError::Serialization("id column should be Utf8".into()))?;
        let metadata_col = column("metadata")?
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| RepositoryError::Serialization("metadata column should be Utf8".into()))?;
        // The _distance column is added by LanceDB vector search
        let distance_col = column("_distance")?
            .as_any()
            .downcast_ref::<Float32Array>()
            .ok_or_else(|| RepositoryError::Serialization("_distance column should be Float32".into()))?;

        let mut hits = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            let id = id_col.value(i).to_string();
            let metadata = match serde_json::from_str::<Metadata>(metadata_col.value(i)) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(memory_id = %id, "unreadable record metadata: {e}");
                    Metadata::new()
                }
            };
            let distance = if distance_col.is_null(i) {
                2.0
            } else {
                distance_col.value(i)
            };
            hits.push(VectorHit {
                id,
                metadata,
                distance,
            });
        }
        Ok(hits)
    }
}

impl VectorIndex for LanceVectorIndex {
    async fn add(&self, records: &[VectorRecord]) -> Result<(), RepositoryError> {
        if records.is_empty() {
            return Ok(());
        }
        let table = self.ensure_table().await?;

        let batch = self.build_record_batch(records)?;
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);

        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to add records: {e}")))?;

        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<VectorHit>, RepositoryError> {
        let Some(table) = self.existing_table().await? else {
            return Ok(Vec::new());
        };

        let results = table
            .vector_search(embedding)
            .map_err(|e| RepositoryError::Query(format!("Vector search setup failed: {e}")))?
            .distance_type(lancedb::DistanceType::Cosine)
            .limit(n_results)
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("Vector search failed: {e}")))?;

        let batches: Vec<RecordBatch> = results
            .try_collect()
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to collect results: {e}")))?;

        let mut hits = Vec::new();
        for batch in &batches {
            hits.extend(Self::batch_to_hits(batch)?);
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(n_results);
        Ok(hits)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let Some(table) = self.existing_table().await? else {
            return Ok(0);
        };
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to count rows: {e}")))?;
        Ok(count as u64)
    }
}
