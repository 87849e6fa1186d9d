use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use swc_cobertura_instrument::{instrument_source, InstrumentOptions};

use crate::{
    excludes::Excludes,
    paths::{logical_file_name, output_path},
};

/// Instruments `.js` files into a mirrored tree below `output_dir`.
pub struct InstrumentFiles<'a, 't> {
    pub output_dir: &'a Path,
    pub cwd: &'a Path,
    pub recursive: bool,
    pub excludes: &'a Excludes<'t>,
    pub instrument_options: &'a InstrumentOptions,
}

#[derive(Debug, Default, PartialEq)]
pub struct InstrumentSummary {
    pub instrumented: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl InstrumentFiles<'_, '_> {
    /// Processes every path; a failing file is logged and counted, the others still run.
    pub fn run(&self, paths: &[PathBuf]) -> InstrumentSummary {
        let mut summary = InstrumentSummary::default();
        for path in paths {
            self.process_path(path, &mut summary);
        }

        tracing::info!(
            instrumented = summary.instrumented,
            skipped = summary.skipped,
            failed = summary.failed,
            "Instrumentation finished"
        );
        summary
    }

    fn process_path(&self, path: &Path, summary: &mut InstrumentSummary) {
        let logical_name = logical_file_name(path, self.cwd);

        if self.excludes.is_excluded(path, &logical_name) {
            tracing::debug!(path = %logical_name, "Excluded");
            summary.skipped += 1;
            return;
        }

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::error!(path = %path.display(), "Could not read path: {}", e);
                summary.failed += 1;
                return;
            }
        };

        if metadata.is_file() {
            if path.extension().and_then(|ext| ext.to_str()) != Some("js") {
                tracing::info!("{} is not a JavaScript file", logical_name);
                summary.skipped += 1;
                return;
            }

            match self.instrument_file(path, &logical_name) {
                Ok(output) => {
                    tracing::debug!(file = %logical_name, output = %output.display(), "Instrumented");
                    summary.instrumented += 1;
                }
                Err(e) => {
                    tracing::error!(file = %logical_name, "Could not instrument file: {:#}", e);
                    summary.failed += 1;
                }
            }
        } else if metadata.is_dir() {
            if !self.recursive {
                tracing::info!(
                    "{} is a directory, maybe use the --recursive option",
                    logical_name
                );
                summary.skipped += 1;
                return;
            }

            if is_same_path(path, self.output_dir) {
                tracing::debug!(dir = %logical_name, "Skipping the output directory");
                return;
            }

            tracing::info!("Recursing into {}", logical_name);
            match read_dir_sorted(path) {
                Ok(entries) => {
                    for entry in entries {
                        self.process_path(&entry, summary);
                    }
                }
                Err(e) => {
                    tracing::error!(dir = %logical_name, "Could not read directory: {:#}", e);
                    summary.failed += 1;
                }
            }
        } else {
            tracing::info!("{} is not a file nor a directory", logical_name);
            summary.skipped += 1;
        }
    }

    fn instrument_file(&self, path: &Path, logical_name: &str) -> Result<PathBuf> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let output = instrument_source(&source, logical_name, self.instrument_options)?;

        let output_file = output_path(self.output_dir, logical_name);
        if let Some(parent) = output_file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&output_file, output.code)
            .with_context(|| format!("Failed to write {}", output_file.display()))?;

        Ok(output_file)
    }
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn is_same_path(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::excludes::normalize_patterns;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn should_instrument_tree_recursively() {
        let cwd = tempfile::tempdir().unwrap();
        let out = cwd.path().join("out");
        write(&cwd.path().join("src/a.js"), "a();\n");
        write(&cwd.path().join("src/notes.txt"), "not js");
        write(&cwd.path().join("src/nested/c.js"), "if (c) {\n  d();\n}\n");
        write(&cwd.path().join("src/broken.js"), "if (\n");
        write(&cwd.path().join("src/vendor/v.js"), "v();\n");

        let patterns = normalize_patterns(&["vendor".to_string()]);
        let excludes = Excludes::new(&patterns);
        let options = InstrumentOptions::default();
        let run = InstrumentFiles {
            output_dir: &out,
            cwd: cwd.path(),
            recursive: true,
            excludes: &excludes,
            instrument_options: &options,
        };

        let summary = run.run(&[cwd.path().join("src")]);
        assert_eq!(
            summary,
            InstrumentSummary {
                instrumented: 2,
                skipped: 2,
                failed: 1,
            }
        );

        let a = fs::read_to_string(out.join("src/a.js")).unwrap();
        assert!(a.contains(r#"__$coberturajs["src/a.js"][1].hits++"#));
        assert!(out.join("src/nested/c.js").exists());
        assert!(!out.join("src/broken.js").exists());
        assert!(!out.join("src/vendor/v.js").exists());
    }

    #[test]
    fn should_skip_directories_without_recursive() {
        let cwd = tempfile::tempdir().unwrap();
        let out = cwd.path().join("out");
        write(&cwd.path().join("src/a.js"), "a();\n");

        let excludes = Excludes::new(&[]);
        let options = InstrumentOptions::default();
        let run = InstrumentFiles {
            output_dir: &out,
            cwd: cwd.path(),
            recursive: false,
            excludes: &excludes,
            instrument_options: &options,
        };

        let summary = run.run(&[cwd.path().join("src")]);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.instrumented, 0);
        assert!(!out.exists());
    }

    #[test]
    fn should_not_recurse_into_output_dir() {
        let cwd = tempfile::tempdir().unwrap();
        let out = cwd.path().join("out");
        write(&cwd.path().join("a.js"), "a();\n");
        write(&out.join("old.js"), "old();\n");

        let excludes = Excludes::new(&[]);
        let options = InstrumentOptions::default();
        let run = InstrumentFiles {
            output_dir: &out,
            cwd: cwd.path(),
            recursive: true,
            excludes: &excludes,
            instrument_options: &options,
        };

        let summary = run.run(&[cwd.path().to_path_buf()]);
        assert_eq!(summary.instrumented, 1);
        assert!(out.join("a.js").exists());
        assert!(!out.join("out/old.js").exists());
    }
}
