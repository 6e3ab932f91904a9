//! Data directory layout for Kappa.

use std::path::{Path, PathBuf};

use kappa_types::config::KappaConfig;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `KAPPA_DATA_DIR` environment variable
/// 2. `~/.kappa`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KAPPA_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".kappa");
    }

    PathBuf::from(".kappa")
}

/// Root of vector tables and graph files: `store_path`, else `{data_dir}/memory`.
pub fn store_dir(data_dir: &Path, config: &KappaConfig) -> PathBuf {
    match &config.store_path {
        Some(path) => resolve_relative(data_dir, path),
        None => data_dir.join("memory"),
    }
}

/// Directory holding the LanceDB tables.
pub fn vector_dir(store_dir: &Path) -> PathBuf {
    store_dir.join("vectors")
}

/// Directory fastembed downloads model files into.
pub fn model_cache_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("models")
}

/// Join `path` onto `base` unless it is already absolute.
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
