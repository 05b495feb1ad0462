//! Descriptive statistics over plain f64 slices.
//!
//! Estimators follow the conventions analysts expect from dataframe tools:
//! sample standard deviation (n - 1), linearly interpolated quantiles,
//! adjusted Fisher-Pearson skewness and bias-corrected excess kurtosis.

use crate::error::Result;
use crate::types::{DescriptiveStats, DistributionShape};
use crate::utils::{numeric_values, require_column, round2};
use polars::prelude::*;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation. `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Quantile of already-sorted values using linear interpolation between the
/// two nearest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Quantile of unsorted values.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// Central moments m2, m3, m4 (biased, divided by n).
fn central_moments(values: &[f64]) -> Option<(f64, f64, f64)> {
    let mean = mean(values)?;
    let n = values.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    Some((m2 / n, m3 / n, m4 / n))
}

/// Adjusted Fisher-Pearson skewness (G1). `None` for fewer than three values;
/// zero for constant data.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let (m2, m3, _) = central_moments(values)?;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let n = n as f64;
    let g1 = m3 / m2.powf(1.5);
    Some((n * (n - 1.0)).sqrt() / (n - 2.0) * g1)
}

/// Bias-corrected excess kurtosis (G2). `None` for fewer than four values;
/// zero for constant data.
pub fn kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let (m2, _, m4) = central_moments(values)?;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let n = n as f64;
    let g2 = m4 / (m2 * m2) - 3.0;
    Some(((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0)))
}

/// count/mean/std/min/quartiles/max for a set of values, rounded to 2
/// decimals. Statistics that are undefined for the sample size are NaN.
pub fn describe_values(column: &str, values: &[f64]) -> DescriptiveStats {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q = |p: f64| quantile_sorted(&sorted, p).map_or(f64::NAN, round2);

    DescriptiveStats {
        column: column.to_string(),
        count: sorted.len(),
        mean: mean(&sorted).map_or(f64::NAN, round2),
        std: sample_std(&sorted).map_or(f64::NAN, round2),
        min: sorted.first().copied().map_or(f64::NAN, round2),
        q25: q(0.25),
        median: q(0.5),
        q75: q(0.75),
        max: sorted.last().copied().map_or(f64::NAN, round2),
    }
}

/// Describe each named column. Every column is required.
pub fn describe_columns(df: &DataFrame, columns: &[&str]) -> Result<Vec<DescriptiveStats>> {
    columns
        .iter()
        .map(|name| -> Result<DescriptiveStats> {
            let values = numeric_values(require_column(df, name)?)?;
            Ok(describe_values(name, &values))
        })
        .collect()
}

/// Skewness and kurtosis of a required column.
pub fn distribution_shape(df: &DataFrame, column: &str) -> Result<DistributionShape> {
    let values = numeric_values(require_column(df, column)?)?;
    Ok(DistributionShape {
        skewness: skewness(&values),
        kurtosis: kurtosis(&values),
    })
}

/// One histogram bin: `[start, end)`, the last bin closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram over the full range of `values`.
///
/// Constant data is widened to `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Gaussian kernel density estimate evaluated at `points`, using Scott's
/// bandwidth (`std * n^(-1/5)`). Empty when the bandwidth is undefined or zero.
pub fn gaussian_kde(values: &[f64], points: &[f64]) -> Vec<f64> {
    let Some(std) = sample_std(values) else {
        return Vec::new();
    };
    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    if bandwidth <= 0.0 || !bandwidth.is_finite() {
        return Vec::new();
    }

    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    points
        .iter()
        .map(|x| {
            values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm
        })
        .collect()
}
