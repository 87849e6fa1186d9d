use serde::{Deserialize, Serialize};

/// Counters for a single instrumented source line.
///
/// Mirrors the runtime entry `{ hits, branch, true, false }` the instrumented
/// program keeps per line. `number` is the 1-based line of the original
/// (not instrumented) source; it is the index of the entry in the runtime
/// registry, so it is not part of the serialized object.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageLine {
    #[serde(skip)]
    pub number: u32,
    pub hits: u64,
    #[serde(default)]
    pub branch: bool,
    #[serde(rename = "true", default)]
    pub true_count: u64,
    #[serde(rename = "false", default)]
    pub false_count: u64,
}

impl CoverageLine {
    pub fn new(number: u32, branch: bool) -> CoverageLine {
        CoverageLine {
            number,
            branch,
            ..Default::default()
        }
    }

    pub fn is_hit(&self) -> bool {
        self.hits > 0
    }

    /// Condition coverage of a branch line, `None` for plain lines.
    pub fn condition_coverage(&self) -> Option<ConditionCoverage> {
        if self.branch {
            Some(ConditionCoverage::from_counts(
                self.true_count,
                self.false_count,
            ))
        } else {
            None
        }
    }
}

/// How many outcomes of an `if` test were observed at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConditionCoverage {
    /// Both outcomes observed.
    Full,
    /// Only one of the outcomes observed.
    Partial,
    /// Test never evaluated.
    Uncovered,
}

impl ConditionCoverage {
    pub fn from_counts(true_count: u64, false_count: u64) -> ConditionCoverage {
        match (true_count > 0, false_count > 0) {
            (true, true) => ConditionCoverage::Full,
            (false, false) => ConditionCoverage::Uncovered,
            _ => ConditionCoverage::Partial,
        }
    }

    /// Contribution of the line to the branch total.
    pub fn weight(&self) -> f64 {
        match self {
            ConditionCoverage::Full => 1.0,
            ConditionCoverage::Partial => 0.5,
            ConditionCoverage::Uncovered => 0.0,
        }
    }

    /// Number of observed outcomes, out of the two an `if` test has.
    pub fn covered_conditions(&self) -> u32 {
        match self {
            ConditionCoverage::Full => 2,
            ConditionCoverage::Partial => 1,
            ConditionCoverage::Uncovered => 0,
        }
    }

    pub fn percentage(&self) -> &'static str {
        match self {
            ConditionCoverage::Full => "100%",
            ConditionCoverage::Partial => "50%",
            ConditionCoverage::Uncovered => "0%",
        }
    }

    /// Label used by the `condition-coverage` attribute, i.e `50% (1/2)`.
    pub fn label(&self) -> String {
        format!(
            "{} ({}/{})",
            self.percentage(),
            self.covered_conditions(),
            CONDITIONS_PER_BRANCH
        )
    }
}

/// An `if` test has exactly two outcomes.
pub const CONDITIONS_PER_BRANCH: u32 = 2;
