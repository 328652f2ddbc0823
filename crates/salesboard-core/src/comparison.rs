use salesboard_domain::{round_half_up, ComparisonPoint};

/// Rounded percentage change of `current` against `reference`. Undefined for a zero reference.
pub fn percentage_delta(current: f64, reference: f64) -> Option<i64> {
    if reference == 0.0 || !reference.is_finite() || !current.is_finite() {
        return None;
    }
    Some(round_half_up((current - reference) / reference * 100.0) as i64)
}

/// Pairs two aligned series index by index. A missing reference value counts as zero.
pub fn compare_series(current: &[f64], reference: &[f64]) -> Vec<ComparisonPoint> {
    current
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let reference = reference.get(index).copied().unwrap_or(0.0);
            ComparisonPoint {
                current: *value,
                reference,
                delta_percent: percentage_delta(*value, reference),
            }
        })
        .collect()
}
