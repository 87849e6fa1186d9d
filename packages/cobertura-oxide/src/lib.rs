mod coverage_line;
mod file_registry;
mod package;
mod rate;
mod registry;
mod report;
mod totals;

pub use coverage_line::{ConditionCoverage, CoverageLine, CONDITIONS_PER_BRANCH};
pub use file_registry::FileRegistry;
pub use package::{group_by_package, package_name};
pub use rate::*;
pub use registry::{CoverageRegistry, SharedCoverageRegistry};
pub use report::*;
pub use totals::CoverageTotals;
