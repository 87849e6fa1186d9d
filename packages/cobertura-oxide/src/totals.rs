use crate::{rate, CoverageLine, CONDITIONS_PER_BRANCH};

/// Running counters for a file, a package or the whole report.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CoverageTotals {
    /// Instrumented lines.
    pub code_lines: u64,
    /// Instrumented lines executed at least once.
    pub hit_lines: u64,
    /// Branch lines.
    pub code_branches: u64,
    /// Sum of branch weights, 1.0 per fully covered and 0.5 per partially covered branch line.
    pub hit_branch_weight: f64,
    /// Observed outcomes over all branch lines.
    pub covered_conditions: u64,
}

impl CoverageTotals {
    pub fn new() -> CoverageTotals {
        Default::default()
    }

    pub fn add_line(&mut self, line: &CoverageLine) {
        self.code_lines += 1;
        if line.is_hit() {
            self.hit_lines += 1;
        }

        if let Some(condition) = line.condition_coverage() {
            self.code_branches += 1;
            self.hit_branch_weight += condition.weight();
            self.covered_conditions += condition.covered_conditions() as u64;
        }
    }

    /// Merges a second totals object into this one
    pub fn merge(&mut self, totals: &CoverageTotals) {
        self.code_lines += totals.code_lines;
        self.hit_lines += totals.hit_lines;
        self.code_branches += totals.code_branches;
        self.hit_branch_weight += totals.hit_branch_weight;
        self.covered_conditions += totals.covered_conditions;
    }

    pub fn line_rate(&self) -> f64 {
        rate(self.hit_lines as f64, self.code_lines)
    }

    pub fn branch_rate(&self) -> f64 {
        rate(self.hit_branch_weight, self.code_branches)
    }

    /// Number of outcomes branch lines can have, two per `if`.
    pub fn valid_conditions(&self) -> u64 {
        self.code_branches * CONDITIONS_PER_BRANCH as u64
    }
}
