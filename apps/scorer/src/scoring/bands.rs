//! Small numeric helpers shared by the table-driven scorers.

/// Linear interpolation of `x` from [x0, x1] onto [y0, y1], clamped to the segment.
pub fn interpolate(x: f64, (x0, x1): (f64, f64), (y0, y1): (f64, f64)) -> f64 {
    if x1 <= x0 {
        return y1;
    }
    let t = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
    y0 + t * (y1 - y0)
}

/// `part / whole · 100`; 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Score of the first row whose lower bound `value` reaches, `fallback` otherwise.
/// Rows are `(min, score)` in descending `min` order.
pub fn at_least(value: f64, rows: &[(f64, f64)], fallback: f64) -> f64 {
    rows.iter()
        .find(|(min, _)| value >= *min)
        .map_or(fallback, |(_, score)| *score)
}

/// Score of the first row whose upper bound covers `value`, `fallback` otherwise.
/// Rows are `(max, score)` in ascending `max` order.
pub fn at_most(value: f64, rows: &[(f64, f64)], fallback: f64) -> f64 {
    rows.iter()
        .find(|(max, _)| value <= *max)
        .map_or(fallback, |(_, score)| *score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_clamps_to_segment() {
        assert_eq!(interpolate(70.0, (60.0, 80.0), (8.0, 10.0)), 9.0);
        assert_eq!(interpolate(50.0, (60.0, 80.0), (8.0, 10.0)), 8.0);
        assert_eq!(interpolate(90.0, (60.0, 80.0), (8.0, 10.0)), 10.0);
        assert_eq!(interpolate(1.0, (5.0, 5.0), (0.0, 3.0)), 3.0);
    }

    #[test]
    fn test_percent_handles_zero() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn test_threshold_tables() {
        let rows = [(80.0, 3.0), (60.0, 2.0), (40.0, 1.0)];
        assert_eq!(at_least(85.0, &rows, 0.0), 3.0);
        assert_eq!(at_least(60.0, &rows, 0.0), 2.0);
        assert_eq!(at_least(10.0, &rows, 0.0), 0.0);

        let rows = [(0.0, 4.0), (2.0, 3.0), (5.0, 2.0)];
        assert_eq!(at_most(0.0, &rows, 0.0), 4.0);
        assert_eq!(at_most(3.0, &rows, 0.0), 2.0);
        assert_eq!(at_most(6.0, &rows, 0.0), 0.0);
    }
}
