//! Percentage helpers used by display rows and participation metrics.

/// `part / whole × 100`, or `None` when `whole` is zero or not finite.
pub fn percent_of(part: f64, whole: f64) -> Option<f64> {
    if whole.is_finite() && whole != 0.0 {
        Some(part / whole * 100.0)
    } else {
        None
    }
}

/// Two-decimal percent string, e.g. `60.00%`.
pub fn format_percent(pct: f64) -> String {
    format!("{pct:.2}%")
}
