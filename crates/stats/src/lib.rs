//! Statistical helper functions for forecast verification.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Root mean square of a set of signed errors: `sqrt(mean(e^2))`.
///
/// All errors are pooled into a single mean, so the RMSE of a union of groups
/// is not the mean of the group RMSEs. Returns 0.0 if empty.
pub fn rmse(errors: &[f64]) -> f64 {
    if errors.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = errors.iter().map(|&e| e * e).sum();
    (sum_sq / errors.len() as f64).sqrt()
}

/// Min and max of a slice, ignoring NaN. Returns `None` if no finite-comparable
/// value exists.
pub fn min_max(data: &[f64]) -> Option<(f64, f64)> {
    data.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Min-max normalise a slice onto `[0, 1]`.
///
/// When every value is equal (including the single-value case) the range is
/// zero and all outputs are 0.0.
pub fn min_max_normalize(data: &[f64]) -> Vec<f64> {
    let Some((lo, hi)) = min_max(data) else {
        return vec![0.0; data.len()];
    };
    let range = hi - lo;
    data.iter()
        .map(|&v| if range > 0.0 { (v - lo) / range } else { 0.0 })
        .collect()
}
