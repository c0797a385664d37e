//! Cache of compiled programs, keyed by entry path and build options.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::{BuildOptions, CompiledUnit};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    entry: PathBuf,
    options: BuildOptions,
}

/// Compiled programs keyed by canonical entry path and the [`BuildOptions`]
/// that located their project configuration.
///
/// Builders sharing a cache with different options keep separate entries
/// for the same file. Entries never expire. Callers clear an entry when
/// its sources change. Two threads building the same key at once may both
/// compile it; the first insert is kept.
#[derive(Debug, Default)]
pub struct ProgramCache {
    entries: RwLock<HashMap<CacheKey, Arc<CompiledUnit>>>,
}

impl ProgramCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache behind an `Arc` for sharing between builders.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// The program cached for `path` under `options`.
    #[must_use]
    pub fn get(&self, path: &Path, options: &BuildOptions) -> Option<Arc<CompiledUnit>> {
        let key = CacheKey {
            entry: path.to_path_buf(),
            options: options.clone(),
        };
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(&key).cloned()
    }

    /// Store a program built with `options` and return the cached one.
    pub fn insert(&self, unit: Arc<CompiledUnit>, options: &BuildOptions) -> Arc<CompiledUnit> {
        let key = CacheKey {
            entry: unit.path().to_path_buf(),
            options: options.clone(),
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.entry(key).or_insert(unit).clone()
    }

    /// Evict every entry for one file, or every entry when `path` is
    /// `None`. Returns the number of entries removed.
    pub fn clear(&self, path: Option<&Path>) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        match path {
            Some(path) => {
                let entry = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
                entries.retain(|key, _| key.entry != entry);
            }
            None => entries.clear(),
        }
        before - entries.len()
    }

    /// Whether any program for `path` is cached.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.keys().any(|key| key.entry == path)
    }

    /// Number of cached programs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
