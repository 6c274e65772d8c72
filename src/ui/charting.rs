/// Compute X (sessions) and Y (rate) bounds for the results chart.
/// Both axes keep a non-degenerate span.
pub fn compute_chart_params(points: &[(f64, f64)]) -> (f64, f64) {
    let highest = points.iter().map(|&(_, y)| y).fold(0.0, f64::max);
    let last = points.last().map(|p| p.0).unwrap_or(1.0);

    (last.max(2.0), highest.round().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
