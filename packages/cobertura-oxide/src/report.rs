//! Report aggregator: turns a populated `CoverageRegistry` into a Cobertura
//! report tree and renders it as XML.
//!
//! ```xml
//! <coverage line-rate=".." branch-rate="..">
//!   <sources><source>..</source></sources>
//!   <packages>
//!     <package name="dir">
//!       <classes>
//!         <class filename="dir/file.js">
//!           <lines>
//!             <line number="1" hits="2" branch="true" condition-coverage="50% (1/2)">
//!               <conditions><condition number="0" type="jump" coverage="50%"/></conditions>
//!             </line>
//!           </lines>
//!         </class>
//!       </classes>
//!     </package>
//!   </packages>
//! </coverage>
//! ```
use std::fmt::{self, Display, Formatter};

use quick_xml::escape::escape;

use crate::{
    format_rate, group_by_package, ConditionCoverage, CoverageLine, CoverageRegistry,
    CoverageTotals, FileRegistry,
};

pub const COBERTURA_DTD: &str = "http://cobertura.sourceforge.net/xml/coverage-04.dtd";
pub const COBERTURA_VERSION: &str = "1.9";

/// Generates the XML report for a registry. An absent registry (the
/// instrumented program never ran) produces a valid report without packages.
pub fn generate_report(registry: Option<&CoverageRegistry>, source_dir: &str) -> String {
    let report = match registry {
        Some(registry) => Report::from_registry(registry, source_dir),
        None => Report::empty(source_dir),
    };

    report.to_string()
}

/// Root of the report, totals over every package.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub totals: CoverageTotals,
    pub sources: Vec<String>,
    pub packages: Vec<PackageReport>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PackageReport {
    pub name: String,
    pub totals: CoverageTotals,
    pub classes: Vec<ClassReport>,
}

/// A single file.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassReport {
    pub filename: String,
    pub totals: CoverageTotals,
    pub lines: Vec<LineReport>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineReport {
    pub number: u32,
    pub hits: u64,
    /// Present for branch lines only.
    pub condition_coverage: Option<ConditionCoverage>,
}

impl Report {
    pub fn empty(source_dir: &str) -> Report {
        Report {
            totals: CoverageTotals::new(),
            sources: vec![source_dir.to_string()],
            packages: vec![],
        }
    }

    #[tracing::instrument(skip_all, fields(files = registry.len()))]
    pub fn from_registry(registry: &CoverageRegistry, source_dir: &str) -> Report {
        let mut report = Report::empty(source_dir);

        for (name, files) in group_by_package(registry) {
            let mut package = PackageReport {
                name: name.to_string(),
                totals: CoverageTotals::new(),
                classes: Vec::with_capacity(files.len()),
            };

            for file_path in files {
                if let Some(file) = registry.get_file(file_path) {
                    let class = ClassReport::from_file_registry(file_path, file);
                    package.totals.merge(&class.totals);
                    package.classes.push(class);
                }
            }

            tracing::debug!(
                package = %package.name,
                line_rate = package.totals.line_rate(),
                branch_rate = package.totals.branch_rate(),
                "Aggregated package"
            );

            report.totals.merge(&package.totals);
            report.packages.push(package);
        }

        report
    }

    pub fn line_rate(&self) -> f64 {
        self.totals.line_rate()
    }

    pub fn branch_rate(&self) -> f64 {
        self.totals.branch_rate()
    }
}

impl ClassReport {
    pub fn from_file_registry(file_path: &str, file: &FileRegistry) -> ClassReport {
        let mut totals = CoverageTotals::new();
        let lines = file
            .lines()
            .map(|line| {
                totals.add_line(line);
                LineReport::from(line)
            })
            .collect();

        ClassReport {
            filename: file_path.to_string(),
            totals,
            lines,
        }
    }
}

impl From<&CoverageLine> for LineReport {
    fn from(line: &CoverageLine) -> Self {
        LineReport {
            number: line.number,
            hits: line.hits,
            condition_coverage: line.condition_coverage(),
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" ?>"#)?;
        writeln!(f, r#"<!DOCTYPE coverage SYSTEM "{}">"#, COBERTURA_DTD)?;
        writeln!(
            f,
            r#"<coverage line-rate="{}" branch-rate="{}" lines-covered="{}" lines-valid="{}" branches-covered="{}" branches-valid="{}" complexity="0.0" version="{}">"#,
            format_rate(self.totals.line_rate()),
            format_rate(self.totals.branch_rate()),
            self.totals.hit_lines,
            self.totals.code_lines,
            self.totals.covered_conditions,
            self.totals.valid_conditions(),
            COBERTURA_VERSION
        )?;

        writeln!(f, "  <sources>")?;
        for source in &self.sources {
            writeln!(f, "    <source>{}</source>", escape(source))?;
        }
        writeln!(f, "  </sources>")?;

        writeln!(f, "  <packages>")?;
        for package in &self.packages {
            write!(f, "{}", package)?;
        }
        writeln!(f, "  </packages>")?;
        writeln!(f, "</coverage>")
    }
}

impl Display for PackageReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            r#"    <package name="{}" line-rate="{}" branch-rate="{}" complexity="0.0">"#,
            escape(&self.name),
            format_rate(self.totals.line_rate()),
            format_rate(self.totals.branch_rate())
        )?;
        writeln!(f, "      <classes>")?;
        for class in &self.classes {
            write!(f, "{}", class)?;
        }
        writeln!(f, "      </classes>")?;
        writeln!(f, "    </package>")
    }
}

impl Display for ClassReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let filename = escape(&self.filename);
        writeln!(
            f,
            r#"        <class name="{}" filename="{}" line-rate="{}" branch-rate="{}" complexity="0.0">"#,
            filename,
            filename,
            format_rate(self.totals.line_rate()),
            format_rate(self.totals.branch_rate())
        )?;
        writeln!(f, "          <lines>")?;
        for line in &self.lines {
            write!(f, "{}", line)?;
        }
        writeln!(f, "          </lines>")?;
        writeln!(f, "        </class>")
    }
}

impl Display for LineReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.condition_coverage {
            None => writeln!(
                f,
                r#"            <line number="{}" hits="{}" branch="false"/>"#,
                self.number, self.hits
            ),
            Some(condition) => {
                writeln!(
                    f,
                    r#"            <line number="{}" hits="{}" branch="true" condition-coverage="{}">"#,
                    self.number,
                    self.hits,
                    condition.label()
                )?;
                writeln!(f, "              <conditions>")?;
                writeln!(
                    f,
                    r#"                <condition number="0" type="jump" coverage="{}"/>"#,
                    condition.percentage()
                )?;
                writeln!(f, "              </conditions>")?;
                writeln!(f, "            </line>")
            }
        }
    }
}
