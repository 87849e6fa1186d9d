use std::path::{Path, PathBuf};

use typed_path::Utf8TypedPath;

/// Normalize a file path to use forward slashes for consistent glob matching
pub fn normalize_path(path: &str) -> String {
    let typed_path = Utf8TypedPath::derive(path);
    if typed_path.is_windows() {
        typed_path.with_unix_encoding().to_string()
    } else if path.contains('\\') {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}

/// Name a file is registered under: relative to the working directory when
/// below it, forward slashes, no leading `./`.
pub fn logical_file_name(path: &Path, cwd: &Path) -> String {
    let relative = path.strip_prefix(cwd).unwrap_or(path);
    let normalized = normalize_path(&relative.to_string_lossy());

    let mut name = normalized.as_str();
    while let Some(stripped) = name.strip_prefix("./") {
        name = stripped;
    }
    name.to_string()
}

/// Mirrored location of an instrumented file below the output directory.
pub fn output_path(output_dir: &Path, logical_file_name: &str) -> PathBuf {
    // never escape the output directory through an absolute name
    output_dir.join(logical_file_name.trim_start_matches('/'))
}
