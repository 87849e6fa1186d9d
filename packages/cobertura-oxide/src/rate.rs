/// Ratio of covered to total, defined as `1.0` when there is nothing to cover.
pub fn rate(covered: f64, total: u64) -> f64 {
    if total > 0 {
        covered / total as f64
    } else {
        1.0
    }
}

/// Formats a rate the way the report prints it: the shortest decimal that
/// round-trips, with integral values keeping one fractional digit (`1.0`).
pub fn format_rate(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
