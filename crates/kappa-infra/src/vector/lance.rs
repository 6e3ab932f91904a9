//! LanceDB connection wrapper.
//!
//! `LanceVectorStore` owns one `lancedb::Connection` rooted at a directory
//! and manages table lifecycle. Every namespace collection is one table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_schema::Schema;

pub struct LanceVectorStore {
    db: lancedb::Connection,
    base_path: PathBuf,
}

impl LanceVectorStore {
    /// Connect to the store at `base_path`, creating the directory first.
    pub async fn new(base_path: PathBuf) -> Result<Self, lancedb::Error> {
        tokio::fs::create_dir_all(&base_path)
            .await
            .map_err(|e| lancedb::Error::CreateDir {
                path: base_path.display().to_string(),
                source: e,
            })?;

        let Some(uri) = base_path.to_str() else {
            return Err(lancedb::Error::InvalidInput {
                message: format!("non UTF-8 store path: {}", base_path.display()),
            });
        };
        let db = lancedb::connect(uri).execute().await?;

        Ok(Self { db, base_path })
    }

    /// The table if it exists.
    pub async fn open_table(&self, name: &str) -> Result<Option<lancedb::Table>, lancedb::Error> {
        match self.db.open_table(name).execute().await {
            Ok(table) => Ok(Some(table)),
            Err(lancedb::Error::TableNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Open `name`, or create it empty with `schema`.
    pub async fn ensure_table(
        &self,
        name: &str,
        schema: Arc<Schema>,
    ) -> Result<lancedb::Table, lancedb::Error> {
        if let Some(table) = self.open_table(name).await? {
            return Ok(table);
        }
        tracing::debug!(table = name, "creating vector table");
        self.db.create_empty_table(name, schema).execute().await
    }

    pub async fn table_names(&self) -> Result<Vec<String>, lancedb::Error> {
        self.db.table_names().execute().await
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
