use std::path::Path;

use wax::Pattern;

use crate::paths::normalize_path;

/// Exclude list of the `instrument` command. An entry excludes a path if it
/// equals the path's file name, or if it is a glob matching the normalized path.
pub struct Excludes<'t> {
    names: &'t [String],
    globs: Option<wax::Any<'t>>,
}

/// Normalizes exclude patterns the way candidate paths are normalized.
pub fn normalize_patterns(patterns: &[String]) -> Vec<String> {
    patterns.iter().map(|s| normalize_path(s)).collect()
}

impl<'t> Excludes<'t> {
    pub fn new(normalized_patterns: &'t [String]) -> Excludes<'t> {
        let globs = if normalized_patterns.is_empty() {
            None
        } else {
            match wax::any(normalized_patterns.iter().map(|s| s.as_str())) {
                Ok(globs) => Some(globs),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not parse exclude globs, only file names will be matched");
                    None
                }
            }
        };

        Excludes {
            names: normalized_patterns,
            globs,
        }
    }

    pub fn is_excluded(&self, path: &Path, logical_file_name: &str) -> bool {
        let file_name = path.file_name().map(|name| name.to_string_lossy());
        if let Some(file_name) = file_name {
            if self.names.iter().any(|name| name.as_str() == file_name) {
                return true;
            }
        }

        match &self.globs {
            Some(globs) => globs.is_match(logical_file_name),
            None => false,
        }
    }
}
