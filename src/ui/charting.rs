/// X (round number) and Y (absolute cents) bounds for the results chart.
/// The Y bound is symmetric around zero and at least 10 cents.
pub fn compute_chart_params(errors: &[(f64, f64)]) -> (f64, f64) {
    let rounds = errors.last().map(|p| p.0).unwrap_or(1.0).max(1.0);
    let widest = errors
        .iter()
        .map(|&(_, cents)| cents.abs())
        .fold(0.0, f64::max);

    (rounds, widest.max(10.0).ceil())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
