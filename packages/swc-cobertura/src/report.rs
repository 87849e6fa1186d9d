use std::{fs, path::Path};

use anyhow::{Context, Result};
use cobertura_oxide::{CoverageRegistry, Report};

/// Reads the registry dump written by the exit hook. A missing or malformed
/// dump is not fatal, the report is just empty.
pub fn read_registry(input: &Path) -> Option<CoverageRegistry> {
    let content = match fs::read_to_string(input) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(input = %input.display(), "Could not read coverage registry: {}", e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(registry) => Some(registry),
        Err(e) => {
            tracing::warn!(input = %input.display(), "Could not parse coverage registry: {}", e);
            None
        }
    }
}

pub fn write_report(input: &Path, source_dir: &str, output: &Path) -> Result<Report> {
    let report = match read_registry(input) {
        Some(registry) => Report::from_registry(&registry, source_dir),
        None => Report::empty(source_dir),
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(output, report.to_string())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        line_rate = report.line_rate(),
        branch_rate = report.branch_rate(),
        packages = report.packages.len(),
        "Wrote {}",
        output.display()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn should_write_report_from_dump() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("registry.json");
        fs::write(
            &input,
            r#"{ "lib/a.js": [null, { "hits": 1, "branch": false, "true": 0, "false": 0 }, null, { "hits": 0, "branch": false, "true": 0, "false": 0 }] }"#,
        )
        .unwrap();
        let output = dir.path().join("reports/coverage.xml");

        let report = write_report(&input, "src", &output).unwrap();
        assert_eq!(report.line_rate(), 0.5);

        let xml = fs::read_to_string(&output).unwrap();
        assert!(xml.contains(r#"<package name="lib" line-rate="0.5""#));
        assert!(xml.contains("<source>src</source>"));
    }

    #[test]
    fn should_write_empty_report_without_dump() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("coverage.xml");

        let report = write_report(&dir.path().join("missing.json"), "src", &output).unwrap();
        assert_eq!(report.packages.len(), 0);

        let xml = fs::read_to_string(&output).unwrap();
        assert!(xml.contains(r#"line-rate="1.0" branch-rate="1.0""#));
    }

    #[test]
    fn should_ignore_malformed_dump() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("registry.json");
        fs::write(&input, "not json").unwrap();

        assert!(read_registry(&input).is_none());
    }
}
