//! Shared numeric helpers

/// Extension trait for tracking minimum and maximum `f64` values in
/// `Option<f64>`.
///
/// Interval and velocity series are floating point, so ordering goes
/// through `partial_cmp`; NaN values are ignored rather than propagated.
///
/// # Example
///
/// ```
/// use mouse_testkit::utils::FloatMinMaxExt;
///
/// let mut min: Option<f64> = None;
/// min.update_min(4.0);
/// min.update_min(2.5);
/// min.update_min(3.0);
/// assert_eq!(min, Some(2.5));
/// ```
pub trait FloatMinMaxExt {
    /// Updates the minimum, storing the value if it's smaller than the
    /// current minimum or if no minimum exists yet.
    fn update_min(&mut self, value: f64);

    /// Updates the maximum, storing the value if it's larger than the
    /// current maximum or if no maximum exists yet.
    fn update_max(&mut self, value: f64);
}

impl FloatMinMaxExt for Option<f64> {
    fn update_min(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        *self = Some(match *self {
            Some(current) if current <= value => current,
            _ => value,
        });
    }

    fn update_max(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        *self = Some(match *self {
            Some(current) if current >= value => current,
            _ => value,
        });
    }
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation; `None` below two samples.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|&x| {
            let diff = x - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.sqrt())
}

/// Convert raw counts to centimeters for a device resolution in counts
/// per inch. A non-positive or non-finite resolution yields 0.
pub fn counts_to_cm(counts: i64, cpi: f64) -> f64 {
    if !cpi.is_finite() || cpi <= 0.0 {
        return 0.0;
    }
    counts as f64 / cpi * 2.54
}

/// Convert raw counts to inches; same degradation rules as
/// [`counts_to_cm`].
pub fn counts_to_inches(counts: i64, cpi: f64) -> f64 {
    if !cpi.is_finite() || cpi <= 0.0 {
        return 0.0;
    }
    counts as f64 / cpi
}
