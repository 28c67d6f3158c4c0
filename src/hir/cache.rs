//! Process-lifetime cache of compiled-unit artifacts.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::artifact::{ArtifactError, ArtifactReader, CompiledUnit, JsonArtifactReader};

/// Memoises loaded artifacts by canonical path.
///
/// Entries are never evicted or invalidated: a stale artifact stays until the
/// process restarts. Reads are idempotent, so one cache can be shared by
/// every resolution call.
pub struct ArtifactCache {
    reader: Arc<dyn ArtifactReader>,
    entries: RwLock<FxHashMap<PathBuf, Arc<CompiledUnit>>>,
}

impl ArtifactCache {
    /// Create an empty cache reading the JSON artifact format.
    pub fn new() -> Self {
        Self::with_reader(JsonArtifactReader)
    }

    /// Create an empty cache backed by a custom reader.
    pub fn with_reader(reader: impl ArtifactReader + 'static) -> Self {
        Self {
            reader: Arc::new(reader),
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Load the artifact at `path`, or return the cached copy.
    ///
    /// Fails if the file is missing or unreadable; failures are not cached.
    pub fn get(&self, path: &Path) -> Result<Arc<CompiledUnit>, ArtifactError> {
        let key = path.canonicalize().map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // Fast path: read lock
        if let Some(unit) = self.entries.read().get(&key) {
            trace!(path = %key.display(), "artifact cache hit");
            return Ok(Arc::clone(unit));
        }

        // Read outside the lock; a racing reader of the same path just
        // loses the insertion below.
        let unit = Arc::new(self.reader.read(&key)?);
        debug!(path = %key.display(), unit = unit.name(), "loaded artifact");

        let mut entries = self.entries.write();
        let unit = entries.entry(key).or_insert(unit);
        Ok(Arc::clone(unit))
    }

    /// Load many artifacts in parallel.
    ///
    /// Returns the paths that failed, with their errors; everything else is
    /// cached afterwards.
    pub fn preload(&self, paths: &[PathBuf]) -> Vec<(PathBuf, ArtifactError)> {
        paths
            .par_iter()
            .filter_map(|path| match self.get(path) {
                Ok(_) => None,
                Err(err) => Some((path.clone(), err)),
            })
            .collect()
    }

    /// Whether `path` is already cached.
    pub fn contains(&self, path: &Path) -> bool {
        path.canonicalize()
            .map(|key| self.entries.read().contains_key(&key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ArtifactCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ArtifactCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactCache")
            .field("count", &self.entries.read().len())
            .finish()
    }
}
