//! Small numeric helpers shared by the analyzers.

/// Round to 2 decimal places: the value is scaled by 100 and rounded half
/// away from zero, so a cent tie such as 0.125 goes up to 0.13.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage change from `from` to `to`; `None` when `from` is zero.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        None
    } else {
        Some((to / from - 1.0) * 100.0)
    }
}

/// Mean, max and min of a non-empty slice.
pub fn mean_max_min(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    Some((mean, max, min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(-2.5), -2.5);
    }

    #[test]
    fn round2_ties_go_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(2.675), 2.68);
    }

    #[test]
    fn pct_change_basic() {
        assert!((pct_change(100.0, 110.0).unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(pct_change(0.0, 5.0), None);
    }

    #[test]
    fn mean_max_min_basic() {
        assert_eq!(mean_max_min(&[1.0, 2.0, 6.0]), Some((3.0, 6.0, 1.0)));
        assert_eq!(mean_max_min(&[]), None);
    }
}
