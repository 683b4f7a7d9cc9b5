//! Descriptive statistics

use std::fmt;

/// Count, moments and quartiles of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); NaN for a single value
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    /// Summarize `values`; `None` when empty
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[n - 1],
        })
    }
}

/// Linearly interpolated quantile of sorted data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count  {:>12}", self.count)?;
        writeln!(f, "mean   {:>12.6}", self.mean)?;
        writeln!(f, "std    {:>12.6}", self.std)?;
        writeln!(f, "min    {:>12.6}", self.min)?;
        writeln!(f, "25%    {:>12.6}", self.q25)?;
        writeln!(f, "50%    {:>12.6}", self.median)?;
        writeln!(f, "75%    {:>12.6}", self.q75)?;
        write!(f, "max    {:>12.6}", self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_basic() {
        let summary = Summary::of(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.q25, 1.75);
        assert_eq!(summary.q75, 3.25);
        assert!((summary.std - 1.2909944487358056).abs() < 1e-12);
    }

    #[test]
    fn test_summary_empty() {
        assert!(Summary::of(&[]).is_none());
    }

    #[test]
    fn test_summary_single_value() {
        let summary = Summary::of(&[7.0]).unwrap();
        assert_eq!(summary.median, 7.0);
        assert!(summary.std.is_nan());
    }

    #[test]
    fn test_summary_display() {
        let text = Summary::of(&[1.0, 2.0, 3.0]).unwrap().to_string();
        assert!(text.starts_with("count"));
        assert!(text.contains("50%"));
        assert!(text.contains("2.000000"));
    }
}
