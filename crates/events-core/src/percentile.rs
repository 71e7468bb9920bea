//! Percentile helper used to cap outlier attendance figures.

// ── Percentile helper ─────────────────────────────────────────────────────────

/// Compute the `p`-th percentile of a **sorted** slice using standard linear
/// interpolation (the same algorithm NumPy's `percentile` and pandas'
/// `quantile` use by default).
///
/// Returns `0.0` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    let len = sorted_data.len();
    if len == 1 {
        return sorted_data[0];
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted_data[lo];
    }
    let frac = rank - lo as f64;
    sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo])
}

/// Same as [`percentile`] but sorts a copy of `values` first.
///
/// NaN values are dropped before sorting.
pub fn percentile_unsorted(values: &[f64], p: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    percentile(&sorted, p)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_empty_returns_zero() {
        assert_eq!(percentile(&[], 95.0), 0.0);
    }

    #[test]
    fn test_percentile_single_element() {
        assert_eq!(percentile(&[42.0], 95.0), 42.0);
        assert_eq!(percentile(&[42.0], 0.0), 42.0);
        assert_eq!(percentile(&[42.0], 100.0), 42.0);
    }

    #[test]
    fn test_percentile_p50_even() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        // rank = 0.5 * 3 = 1.5 → interpolate between data[1]=2 and data[2]=3
        assert!((percentile(&data, 50.0) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_extremes() {
        let data = vec![10.0, 20.0, 30.0];
        assert!((percentile(&data, 0.0) - 10.0).abs() < 1e-9);
        assert!((percentile(&data, 100.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_p95_twenty_elements() {
        // 1..=20: rank = 0.95 * 19 = 18.05 → 19 + 0.05 * (20 - 19) = 19.05
        let data: Vec<f64> = (1..=20).map(f64::from).collect();
        let p95 = percentile(&data, 95.0);
        assert!((p95 - 19.05).abs() < 1e-9, "p95 = {p95}");
    }

    #[test]
    fn test_percentile_out_of_range_p_is_clamped() {
        let data = vec![1.0, 2.0];
        assert_eq!(percentile(&data, 150.0), 2.0);
        assert_eq!(percentile(&data, -5.0), 1.0);
    }

    #[test]
    fn test_percentile_unsorted_sorts_and_drops_nan() {
        let values = vec![30.0, f64::NAN, 10.0, 20.0];
        assert!((percentile_unsorted(&values, 50.0) - 20.0).abs() < 1e-9);
    }
}
