use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{LoadError, load_file};
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Load memoization
// ---------------------------------------------------------------------------

/// Loaded datasets keyed by the path they were read from.
///
/// Entries live until the cache is dropped, which for the app is the end of
/// the process. The file is never re-checked once cached. Failed loads are not
/// remembered, so a file that shows up later can still be opened.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, reading and normalizing it on
    /// first use.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        if let Some(ds) = self.entries.get(path) {
            log::debug!("dataset cache hit for {}", path.display());
            return Ok(Arc::clone(ds));
        }

        let dataset = Arc::new(load_file(path)?);
        log::info!(
            "Loaded {} rows x {} columns from {}",
            dataset.len(),
            dataset.columns.len(),
            path.display()
        );
        self.entries.insert(path.to_path_buf(), Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
