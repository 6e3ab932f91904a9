use thiserror::Error;

/// Construction-time configuration errors.
///
/// These are fatal: a namespace whose ingestor table fails to compile is
/// never opened.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no ingestors defined for namespace '{0}'")]
    NoIngestors(String),

    #[error("required ingestor '{ingestor}' is not defined for namespace '{namespace}'")]
    MissingIngestor { namespace: String, ingestor: String },

    #[error("invalid ingestor '{ingestor}': {reason}")]
    InvalidIngestor { ingestor: String, reason: String },

    #[error("failed to read config '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config '{path}': {reason}")]
    Parse { path: String, reason: String },
}

/// Errors from storage adapters (vector index, graph persistence, embedder).
///
/// Used by the capability traits in kappa-core; the engine maps them into
/// [`MemoryError`] so callers see one error vocabulary.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Per-call errors of the memory engine.
///
/// Always returned as values so a long-running agent session can branch on
/// them; the tool layer renders them as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("ingestor '{ingestor}' is not defined for {namespace}")]
    UnknownIngestor { namespace: String, ingestor: String },

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("vector index error: {0}")]
    VectorIndex(String),

    #[error("graph persistence error: {0}")]
    GraphPersistence(String),

    #[error("node '{0}' not found")]
    NodeNotFound(String),
}
