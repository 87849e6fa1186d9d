use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use serde::{de::IgnoredAny, Deserialize, Serialize};

use crate::{CoverageLine, FileRegistry};

/// Process-wide coverage registry, a map of `FileRegistry` keyed by file path.
///
/// Instrumented code creates it lazily on first use and mutates its counters
/// while the program runs; the report aggregator only reads it, after the
/// program finished. File order is insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "RawCoverageRegistry",
    into = "IndexMap<String, FileRegistry>"
)]
pub struct CoverageRegistry {
    files: IndexMap<String, FileRegistry>,
}

impl CoverageRegistry {
    pub fn new() -> CoverageRegistry {
        Default::default()
    }

    /// Resets the registry of a file to the given lines with zeroed counters,
    /// the same as an instrumented file's prologue does when it is loaded.
    pub fn initialize_file(
        &mut self,
        file_path: &str,
        lines: impl IntoIterator<Item = CoverageLine>,
    ) {
        let registry = lines
            .into_iter()
            .map(|line| CoverageLine::new(line.number, line.branch))
            .collect();

        self.files.insert(file_path.to_string(), registry);
    }

    /// `registry[file][line].hits++`. Returns false if the line was never registered.
    pub fn increment_hits(&mut self, file_path: &str, line: u32) -> bool {
        match self.line_mut(file_path, line) {
            Some(line) => {
                line.hits += 1;
                true
            }
            None => false,
        }
    }

    /// `registry[file][line].true++` or `.false++` depending on the outcome of the test.
    /// Returns false if the line was never registered.
    pub fn record_branch(&mut self, file_path: &str, line: u32, outcome: bool) -> bool {
        match self.line_mut(file_path, line) {
            Some(line) => {
                if outcome {
                    line.true_count += 1;
                } else {
                    line.false_count += 1;
                }
                true
            }
            None => false,
        }
    }

    fn line_mut(&mut self, file_path: &str, line: u32) -> Option<&mut CoverageLine> {
        self.files
            .get_mut(file_path)
            .and_then(|registry| registry.get_mut(line))
    }

    pub fn get_file(&self, file_path: &str) -> Option<&FileRegistry> {
        self.files.get(file_path)
    }

    /// File paths in insertion order.
    pub fn get_files(&self) -> Vec<&String> {
        self.files.keys().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileRegistry)> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl From<CoverageRegistry> for IndexMap<String, FileRegistry> {
    fn from(registry: CoverageRegistry) -> Self {
        registry.files
    }
}

#[derive(Deserialize)]
#[serde(transparent)]
struct RawCoverageRegistry(IndexMap<String, RawFileEntry>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFileEntry {
    Registry(FileRegistry),
    Malformed(IgnoredAny),
}

impl From<RawCoverageRegistry> for CoverageRegistry {
    fn from(raw: RawCoverageRegistry) -> Self {
        let mut files = IndexMap::with_capacity(raw.0.len());
        for (file_path, entry) in raw.0 {
            match entry {
                RawFileEntry::Registry(registry) => {
                    files.insert(file_path, registry);
                }
                RawFileEntry::Malformed(_) => {
                    tracing::warn!(file = %file_path, "Skipping malformed file registry");
                }
            }
        }
        CoverageRegistry { files }
    }
}

/// Shared handle to a `CoverageRegistry`, injected into every party that
/// records into or reads from the same registry.
///
/// Counter updates are serialized by a mutex so concurrent increments are
/// never lost. Clones share the registry; separately created handles are
/// isolated from each other.
#[derive(Clone, Debug, Default)]
pub struct SharedCoverageRegistry {
    inner: Arc<Mutex<CoverageRegistry>>,
}

impl SharedCoverageRegistry {
    pub fn new() -> SharedCoverageRegistry {
        Default::default()
    }

    /// Runs `f` with exclusive access to the registry.
    pub fn update<R>(&self, f: impl FnOnce(&mut CoverageRegistry) -> R) -> R {
        let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut registry)
    }

    pub fn increment_hits(&self, file_path: &str, line: u32) -> bool {
        self.update(|registry| registry.increment_hits(file_path, line))
    }

    pub fn record_branch(&self, file_path: &str, line: u32, outcome: bool) -> bool {
        self.update(|registry| registry.record_branch(file_path, line, outcome))
    }

    /// Copy of the current state, for the aggregator to read once the program completed.
    pub fn snapshot(&self) -> CoverageRegistry {
        self.update(|registry| registry.clone())
    }
}
