//! Arrow schema for memory record tables.
//!
//! Arrow versions MUST match lancedb's transitive dependency (57.3 for lancedb 0.26).

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};

/// Schema for one namespace collection.
///
/// `metadata` holds the record's metadata map as a JSON string; the vector
/// width follows the embedder's dimension.
pub fn memory_record_schema(dimension: i32) -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("namespace", DataType::Utf8, false),
        Field::new("metadata", DataType::Utf8, false),
        Field::new("created_at", DataType::Utf8, false),
        Field::new("vector", vector_type(dimension), false),
    ])
}

/// `FixedSizeList<Float32>` of the given width.
pub fn vector_type(dimension: i32) -> DataType {
    DataType::FixedSizeList(
        Arc::new(Field::new("item", DataType::Float32, true)),
        dimension,
    )
}
