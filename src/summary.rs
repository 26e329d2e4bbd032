//! Window summary statistics
//!
//! Computes per-metric average, minimum and maximum over the daily samples,
//! each rounded to the metric's precision.

use crate::catalog::{round_to, MetricCatalog, HEIGHT_PRECISION};
use crate::error::GenerateError;
use crate::types::{DailySample, SummaryStats};

/// Summarize a non-empty set of daily samples
pub fn summarize(
    catalog: &MetricCatalog,
    samples: &[DailySample],
) -> Result<SummaryStats, GenerateError> {
    if samples.is_empty() {
        return Err(GenerateError::EmptyWindow);
    }

    let mut stats = SummaryStats::default();

    for spec in catalog.iter() {
        let values: Vec<f64> = samples.iter().map(|s| s.values.get(spec.metric)).collect();
        let (avg, min, max) = avg_min_max(&values);
        stats.avg.values.set(spec.metric, spec.round(avg));
        stats.min.values.set(spec.metric, spec.round(min));
        stats.max.values.set(spec.metric, spec.round(max));
    }

    let heights: Vec<f64> = samples.iter().map(|s| s.height).collect();
    let (avg, min, max) = avg_min_max(&heights);
    stats.avg.height = round_to(avg, HEIGHT_PRECISION);
    stats.min.height = round_to(min, HEIGHT_PRECISION);
    stats.max.height = round_to(max, HEIGHT_PRECISION);

    Ok(stats)
}

fn avg_min_max(values: &[f64]) -> (f64, f64, f64) {
    let sum: f64 = values.iter().sum();
    let avg = sum / values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (avg, min, max)
}
