mod constants;
mod coverage_template;
mod error;
mod instrument;
mod options;
mod transform;
mod utils;
mod visitors;

pub use cobertura_oxide::CoverageLine;
pub use error::InstrumentError;
pub use options::instrument_options::*;
pub use transform::*;
pub use utils::node::Node;
pub use visitors::coverage_visitor::{create_coverage_instrumentation_visitor, CoverageVisitor};
