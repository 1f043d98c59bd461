//! Locates the order and customer exports backing the record store.
//!
//! The store is read-only: exports are produced elsewhere (an e-commerce
//! platform sync or a `mongoexport` dump) and dropped into a data directory.
//! Each collection is fingerprinted by size and modification time so that a
//! refreshed export is picked up on the next query.

use crate::config;
use crate::error::{MetricsError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Identity of an export file at the time it was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl Fingerprint {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|e| {
            MetricsError::StoreUnavailable(format!("cannot stat {}: {}", path.display(), e))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Resolves collection names to export files.
pub struct RecordStore {
    /// Directory searched for export files.
    pub data_dir: PathBuf,
    overrides: HashMap<String, PathBuf>,
}

impl RecordStore {
    /// Create a store rooted at `data_dir`, or the platform default data
    /// directory when `None`.
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.unwrap_or_else(config::default_data_dir),
            overrides: HashMap::new(),
        }
    }

    /// Pin a collection to an explicit file instead of probing the data directory.
    pub fn with_file<P: AsRef<Path>>(mut self, collection: &str, path: P) -> Self {
        self.overrides
            .insert(collection.to_string(), path.as_ref().to_path_buf());
        self
    }

    /// Find the export file for a collection.
    pub fn locate(&self, collection: &str) -> Result<PathBuf> {
        if let Some(path) = self.overrides.get(collection) {
            if path.is_file() {
                return Ok(path.clone());
            }
            return Err(MetricsError::StoreUnavailable(format!(
                "export for '{}' not found at {}",
                collection,
                path.display()
            )));
        }

        let files = config::collection_files();
        let candidates = files.get(collection).ok_or_else(|| {
            MetricsError::NotFound(format!("Unknown collection: {}", collection))
        })?;

        candidates
            .iter()
            .map(|name| self.data_dir.join(name))
            .find(|p| p.is_file())
            .ok_or_else(|| {
                MetricsError::StoreUnavailable(format!(
                    "no export for '{}' in {} (looked for {})",
                    collection,
                    self.data_dir.display(),
                    candidates.join(", ")
                ))
            })
    }

    /// Whether the export behind `collection` changed since `loaded` was taken.
    ///
    /// A file that disappeared counts as stale so the reload surfaces the error.
    pub fn is_stale(&self, collection: &str, loaded: &Fingerprint) -> bool {
        match self.locate(collection).and_then(|p| Fingerprint::of(&p)) {
            Ok(current) => &current != loaded,
            Err(_) => true,
        }
    }
}
