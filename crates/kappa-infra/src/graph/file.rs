//! JSON file persistence for namespace graphs.
//!
//! Each namespace graph lives in `{store}/{namespace}_graph.json`. Saves write
//! a sibling `.tmp` file, sync it, and rename it over the target, so a crash
//! mid-write leaves the previous snapshot intact.
//!
//! Writers in different processes serialize on an advisory lock taken on
//! `{store}/{namespace}_graph.lock`. The lock lives in its own file because
//! the graph file is replaced on every save.

use std::path::{Path, PathBuf};

use kappa_core::memory::graph_store::GraphPersistence;
use kappa_types::error::RepositoryError;
use kappa_types::graph::GraphSnapshot;
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;

/// Graph snapshot stored as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonGraphFile {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Exclusive hold on a namespace graph file, released on drop.
#[derive(Debug)]
pub struct GraphFileLock {
    _release: oneshot::Sender<()>,
}

impl JsonGraphFile {
    /// Graph file for `namespace` under `store_dir`.
    pub fn new(store_dir: &Path, namespace: &str) -> Self {
        Self {
            path: Self::graph_path(store_dir, namespace),
            lock_path: store_dir.join(format!("{namespace}_graph.lock")),
        }
    }

    pub fn graph_path(store_dir: &Path, namespace: &str) -> PathBuf {
        store_dir.join(format!("{namespace}_graph.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RepositoryError::Io(format!("failed to create {}: {e}", parent.display())))?;
        }
        Ok(())
    }
}

impl GraphPersistence for JsonGraphFile {
    type Lock = GraphFileLock;

    async fn lock(&self) -> Result<GraphFileLock, RepositoryError> {
        self.ensure_parent().await?;

        let (acquired_tx, acquired_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let lock_path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || hold_lock(&lock_path, acquired_tx, release_rx));

        acquired_rx
            .await
            .map_err(|_| RepositoryError::Io("graph lock holder exited".to_string()))??;
        Ok(GraphFileLock {
            _release: release_tx,
        })
    }

    async fn load(&self) -> Result<GraphSnapshot, RepositoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No graph file at {}, starting empty", self.path.display());
                return Ok(GraphSnapshot::default());
            }
            Err(err) => {
                return Err(RepositoryError::Io(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            RepositoryError::Serialization(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    async fn save(&self, snapshot: &GraphSnapshot) -> Result<(), RepositoryError> {
        self.ensure_parent().await?;

        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        let write_err =
            |e: std::io::Error| RepositoryError::Io(format!("failed to write {}: {e}", temp_path.display()));
        let mut file = tokio::fs::File::create(&temp_path).await.map_err(write_err)?;
        file.write_all(&bytes).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| RepositoryError::Io(format!("failed to replace {}: {e}", self.path.display())))?;

        // The rename itself is only durable once the directory entry is.
        #[cfg(unix)]
        if let Some(parent) = self.path.parent() {
            let dir = tokio::fs::File::open(parent)
                .await
                .map_err(|e| RepositoryError::Io(format!("failed to open {}: {e}", parent.display())))?;
            dir.sync_all()
                .await
                .map_err(|e| RepositoryError::Io(format!("failed to sync {}: {e}", parent.display())))?;
        }

        Ok(())
    }
}

/// Runs on a blocking thread: take the file lock, report back, and hold it
/// until the matching `GraphFileLock` is dropped.
fn hold_lock(
    path: &Path,
    acquired: oneshot::Sender<Result<(), RepositoryError>>,
    release: oneshot::Receiver<()>,
) {
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) => {
            let _ = acquired.send(Err(RepositoryError::Io(format!(
                "failed to open {}: {e}",
                path.display()
            ))));
            return;
        }
    };

    let mut lock = fd_lock::RwLock::new(file);
    let guard = match lock.write() {
        Ok(guard) => guard,
        Err(e) => {
            let _ = acquired.send(Err(RepositoryError::Io(format!(
                "failed to lock {}: {e}",
                path.display()
            ))));
            return;
        }
    };

    // A dropped receiver means the waiter gave up; release right away.
    if acquired.send(Ok(())).is_ok() {
        let _ = release.blocking_recv();
    }
    drop(guard);
}
