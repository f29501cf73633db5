//! Small descriptive statistics helpers.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Linear-interpolated quantile of already sorted values, `q` in [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Median; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted_copy(values), 0.5)
}

/// Count, mean, sample std, min, quartiles and max.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN with fewer than two values.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    pub fn describe(values: &[f64]) -> Option<Self> {
        let sorted = sorted_copy(values);
        let n = sorted.len();
        let mean = mean(&sorted)?;
        let std = if n > 1 {
            (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Some(Summary {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25)?,
            median: quantile_sorted(&sorted, 0.5)?,
            q75: quantile_sorted(&sorted, 0.75)?,
            max: sorted[n - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile_sorted(&sorted, 0.25).unwrap(), 1.75);
        assert_relative_eq!(quantile_sorted(&sorted, 0.75).unwrap(), 3.25);
        assert_relative_eq!(quantile_sorted(&sorted, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile_sorted(&sorted, 1.0).unwrap(), 4.0);
    }

    #[test]
    fn describe_matches_known_values() {
        let s = Summary::describe(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.count, 8);
        assert_relative_eq!(s.mean, 5.0);
        assert_relative_eq!(s.std, 2.138_089_935_299_395, epsilon = 1e-12);
        assert_relative_eq!(s.min, 2.0);
        assert_relative_eq!(s.q25, 4.0);
        assert_relative_eq!(s.median, 4.5);
        assert_relative_eq!(s.q75, 5.5);
        assert_relative_eq!(s.max, 9.0);
    }

    #[test]
    fn describe_single_value_has_nan_std() {
        let s = Summary::describe(&[10.0]).unwrap();
        assert!(s.std.is_nan());
        assert_relative_eq!(s.median, 10.0);
        assert!(Summary::describe(&[]).is_none());
    }
}
