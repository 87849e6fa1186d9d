use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{de::IgnoredAny, Deserialize, Serialize};

use crate::CoverageLine;

/// Sparse per-file registry: only instrumented lines are present, keyed by
/// their 1-based line number and always iterated in ascending line order.
///
/// Serializes the way the runtime keeps it, an array indexed by line number
/// with `null` holes. Deserializing also accepts an object keyed by line
/// number; entries that are not valid coverage lines are skipped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFileRegistry", into = "Vec<Option<CoverageLine>>")]
pub struct FileRegistry {
    lines: BTreeMap<u32, CoverageLine>,
}

impl FileRegistry {
    pub fn new() -> FileRegistry {
        Default::default()
    }

    /// Registers a line discovered by instrumentation.
    ///
    /// A line already present is not registered twice; discovering it as a
    /// branch upgrades an existing plain line to a branch line.
    /// Returns true if the line was not present yet.
    pub fn discover(&mut self, number: u32, branch: bool) -> bool {
        match self.lines.get_mut(&number) {
            Some(line) => {
                line.branch |= branch;
                false
            }
            None => {
                self.lines.insert(number, CoverageLine::new(number, branch));
                true
            }
        }
    }

    /// Inserts (or replaces) a line entry.
    pub fn insert(&mut self, line: CoverageLine) {
        self.lines.insert(line.number, line);
    }

    pub fn get(&self, number: u32) -> Option<&CoverageLine> {
        self.lines.get(&number)
    }

    pub fn get_mut(&mut self, number: u32) -> Option<&mut CoverageLine> {
        self.lines.get_mut(&number)
    }

    /// Present lines, ascending by line number.
    pub fn lines(&self) -> impl Iterator<Item = &CoverageLine> {
        self.lines.values()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl FromIterator<CoverageLine> for FileRegistry {
    fn from_iter<T: IntoIterator<Item = CoverageLine>>(iter: T) -> Self {
        let mut registry = FileRegistry::new();
        for line in iter {
            registry.insert(line);
        }
        registry
    }
}

impl From<FileRegistry> for Vec<Option<CoverageLine>> {
    fn from(registry: FileRegistry) -> Self {
        let len = registry
            .lines
            .keys()
            .next_back()
            .map(|last| *last as usize + 1)
            .unwrap_or(0);

        let mut dense = vec![None; len];
        for (number, line) in registry.lines {
            dense[number as usize] = Some(line);
        }
        dense
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFileRegistry {
    Dense(Vec<Option<RawCoverageLine>>),
    Sparse(IndexMap<String, Option<RawCoverageLine>>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoverageLine {
    Line(CoverageLine),
    Malformed(IgnoredAny),
}

impl From<RawFileRegistry> for FileRegistry {
    fn from(raw: RawFileRegistry) -> Self {
        let entries: Vec<(Option<u32>, String, Option<RawCoverageLine>)> = match raw {
            RawFileRegistry::Dense(lines) => lines
                .into_iter()
                .enumerate()
                .map(|(index, line)| (u32::try_from(index).ok(), index.to_string(), line))
                .collect(),
            RawFileRegistry::Sparse(lines) => lines
                .into_iter()
                .map(|(key, line)| (key.parse::<u32>().ok(), key, line))
                .collect(),
        };

        let mut registry = FileRegistry::new();
        for (number, key, line) in entries {
            match (number, line) {
                (_, None) => {}
                (Some(number), Some(RawCoverageLine::Line(mut line))) if number > 0 => {
                    line.number = number;
                    registry.insert(line);
                }
                (_, Some(RawCoverageLine::Line(_))) => {
                    tracing::warn!(line = %key, "Skipping coverage entry with invalid line number");
                }
                (_, Some(RawCoverageLine::Malformed(_))) => {
                    tracing::warn!(line = %key, "Skipping malformed coverage entry");
                }
            }
        }
        registry
    }
}
