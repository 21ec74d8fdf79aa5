//! Trailing-window and summary statistics over nullable series.
//!
//! A trailing statistic at index `i` covers `values[i + 1 - window ..= i]`.
//! It is null until `window` rows have been seen, and null whenever any value
//! in the window is null (no partial windows).

/// Trailing simple moving average.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, mean)
}

/// Trailing sample standard deviation (divides by `window - 1`).
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, sample_std)
}

fn rolling(
    values: &[Option<f64>],
    window: usize,
    stat: fn(&[f64]) -> Option<f64>,
) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];
    if window == 0 || n < window {
        return result;
    }

    let mut buf = Vec::with_capacity(window);
    for i in (window - 1)..n {
        buf.clear();
        buf.extend(values[(i + 1 - window)..=i].iter().map_while(|v| *v));
        if buf.len() == window {
            result[i] = stat(&buf);
        }
    }
    result
}

/// Fractional change from the previous row: `(x[i] - x[i-1]) / x[i-1]`.
///
/// The first row, rows next to a null, and rows whose predecessor is zero
/// are null.
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    if values.is_empty() {
        return result;
    }
    result.push(None);
    for pair in values.windows(2) {
        result.push(match (pair[0], pair[1]) {
            (Some(prev), Some(cur)) if prev != 0.0 => Some((cur - prev) / prev),
            _ => None,
        });
    }
    result
}

/// `a / b`, null on a null operand or a zero divisor.
pub fn safe_div(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) if b != 0.0 => Some(a / b),
        _ => None,
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation; null for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_approx(actual: Option<f64>, expected: f64) {
        let a = actual.expect("expected a value, got null");
        assert!(
            (a - expected).abs() < EPSILON,
            "expected {expected}, got {a}"
        );
    }

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn rolling_mean_5_basic() {
        let result = rolling_mean(&some(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]), 5);
        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_none(), "expected null at index {i}");
        }
        assert_approx(result[4], 12.0);
        assert_approx(result[5], 13.0);
        assert_approx(result[6], 14.0);
    }

    #[test]
    fn rolling_mean_null_in_window() {
        let mut values = some(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        values[2] = None;
        let result = rolling_mean(&values, 3);
        assert!(result[2].is_none());
        assert!(result[3].is_none());
        assert!(result[4].is_none());
        assert_approx(result[5], 14.0);
    }

    #[test]
    fn rolling_too_few_rows() {
        let result = rolling_mean(&some(&[1.0, 2.0]), 5);
        assert!(result.iter().all(|v| v.is_none()));
        assert!(rolling_std(&some(&[1.0]), 10).iter().all(|v| v.is_none()));
    }

    #[test]
    fn rolling_std_is_sample_std() {
        // 2,4,4,4,5,5,7,9 -> sample variance 32/7
        let values = some(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let result = rolling_std(&values, 8);
        assert_approx(result[7], (32.0_f64 / 7.0).sqrt());
    }

    #[test]
    fn rolling_std_of_constant_is_zero() {
        let result = rolling_std(&some(&[5.0; 12]), 10);
        assert!(result[8].is_none());
        assert_approx(result[9], 0.0);
        assert_approx(result[11], 0.0);
    }

    #[test]
    fn pct_change_handles_nulls_and_zero() {
        let values = vec![Some(100.0), Some(110.0), None, Some(50.0), Some(0.0), Some(10.0)];
        let result = pct_change(&values);
        assert_eq!(result.len(), 6);
        assert!(result[0].is_none());
        assert_approx(result[1], 0.1);
        assert!(result[2].is_none());
        assert!(result[3].is_none());
        assert_approx(result[4], -1.0);
        assert!(result[5].is_none());
        assert!(pct_change(&[]).is_empty());
    }

    #[test]
    fn safe_div_rules() {
        assert_eq!(safe_div(Some(1.0), Some(4.0)), Some(0.25));
        assert_eq!(safe_div(Some(1.0), Some(0.0)), None);
        assert_eq!(safe_div(None, Some(2.0)), None);
        assert_eq!(safe_div(Some(1.0), None), None);
    }

    #[test]
    fn summary_stats() {
        let v = [10.0, 20.0, 30.0];
        assert_approx(mean(&v), 20.0);
        assert_approx(sample_std(&v), 10.0);
        assert_eq!(min(&v), Some(10.0));
        assert_eq!(max(&v), Some(30.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std(&[1.0]), None);
        assert_eq!(min(&[]), None);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(7.0710678, 2), 7.07);
        assert_eq!(round_to(2.345, 1), 2.3);
        assert_eq!(round_to(-1.005, 0), -1.0);
        assert_eq!(round_to(15.0, 2), 15.0);
    }
}
