//! Anomaly injection
//!
//! Perturbs selected metrics of a generated series into one of three
//! deviation patterns:
//! - Spike: occasional one-day jump up or down
//! - Trend: steady drift in a single direction across the window
//! - Oscillation: deterministic alternating swing driven by the day index

use crate::baseline::random_in_range;
use crate::catalog::{Metric, MetricCatalog, MetricSpec};
use crate::types::DailySample;
use rand::seq::index;
use rand::Rng;
use serde::Serialize;

/// Probability that a spike fires on a given day
pub const SPIKE_PROBABILITY: f64 = 0.15;

/// Angular step per day for oscillation
const OSCILLATION_STEP: f64 = 2.5;

/// Oscillation amplitude in multiples of normal variation
const OSCILLATION_AMPLITUDE: f64 = 1.5;

/// Deviation pattern applied to one metric for a whole record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Spike,
    /// Drift up (`+1`) or down (`-1`), fixed for the record
    Trend { sign: i8 },
    Oscillation,
    /// Plain day-to-day noise
    Noise,
}

/// Metrics chosen for variation and their patterns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariationPlan {
    pub patterns: Vec<(Metric, PatternKind)>,
}

/// Choose 1-3 metrics (50/30/20 %) and a pattern for each
/// (trend 50 %, spike 30 %, oscillation 20 %)
pub fn plan_variations<R: Rng + ?Sized>(rng: &mut R) -> VariationPlan {
    let roll: f64 = rng.gen();
    let count = if roll < 0.5 {
        1
    } else if roll < 0.8 {
        2
    } else {
        3
    };

    let metrics: Vec<Metric> = index::sample(rng, Metric::COUNT, count)
        .into_iter()
        .map(|i| Metric::ALL[i])
        .collect();
    let patterns = metrics
        .into_iter()
        .map(|metric| (metric, choose_pattern(rng)))
        .collect();

    VariationPlan { patterns }
}

fn choose_pattern<R: Rng + ?Sized>(rng: &mut R) -> PatternKind {
    let roll: f64 = rng.gen();
    if roll < 0.5 {
        let sign = if rng.gen_bool(0.5) { 1 } else { -1 };
        PatternKind::Trend { sign }
    } else if roll < 0.8 {
        PatternKind::Spike
    } else {
        PatternKind::Oscillation
    }
}

/// Apply a pattern to one value.
///
/// `day_index` is the 0-based position among the measured days and
/// `total_days` the number of measured days.
pub fn inject<R: Rng + ?Sized>(
    spec: &MetricSpec,
    value: f64,
    day_index: usize,
    total_days: usize,
    pattern: PatternKind,
    rng: &mut R,
) -> f64 {
    let nv = spec.normal_variation;

    match pattern {
        PatternKind::Spike => {
            if rng.gen::<f64>() < SPIKE_PROBABILITY {
                let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let magnitude = random_in_range(rng, nv, nv * spec.spike_max_factor, 2);
                value + direction * magnitude
            } else {
                value
            }
        }
        PatternKind::Trend { sign } => {
            if total_days == 0 {
                return value;
            }
            let normalized_day = day_index as f64 / total_days as f64;
            value + f64::from(sign) * nv * normalized_day * total_days as f64 * spec.trend_factor
        }
        PatternKind::Oscillation => {
            value + nv * (day_index as f64 * OSCILLATION_STEP).sin() * OSCILLATION_AMPLITUDE
        }
        PatternKind::Noise => value + random_in_range(rng, -nv, nv, 2),
    }
}

/// Apply a variation plan to the samples in place, re-rounding every
/// perturbed value to its metric precision
pub fn apply_plan<R: Rng + ?Sized>(
    catalog: &MetricCatalog,
    plan: &VariationPlan,
    samples: &mut [DailySample],
    rng: &mut R,
) {
    let total_days = samples.len();
    for (day_index, sample) in samples.iter_mut().enumerate() {
        for &(metric, pattern) in &plan.patterns {
            let spec = catalog.get(metric);
            let modified = inject(
                spec,
                sample.values.get(metric),
                day_index,
                total_days,
                pattern,
                rng,
            );
            sample.values.set(metric, spec.round(modified));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricValues;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> MetricCatalog {
        MetricCatalog::standard()
    }

    #[test]
    fn test_oscillation_is_deterministic() {
        let catalog = catalog();
        let spec = catalog.get(Metric::Hr);
        let mut a = StdRng::seed_from_u64(1);
        let mut b = StdRng::seed_from_u64(99);

        for day in 0..5 {
            let x = inject(spec, 70.0, day, 5, PatternKind::Oscillation, &mut a);
            let y = inject(spec, 70.0, day, 5, PatternKind::Oscillation, &mut b);
            assert_eq!(x, y);
            let expected = 70.0 + 8.0 * (day as f64 * 2.5).sin() * 1.5;
            assert!((x - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_oscillation_alternates() {
        let catalog = catalog();
        let spec = catalog.get(Metric::Sys);
        let mut rng = StdRng::seed_from_u64(5);
        let d1 = inject(spec, 120.0, 1, 5, PatternKind::Oscillation, &mut rng) - 120.0;
        let d2 = inject(spec, 120.0, 2, 5, PatternKind::Oscillation, &mut rng) - 120.0;
        // sin(2.5) > 0, sin(5.0) < 0
        assert!(d1 > 0.0);
        assert!(d2 < 0.0);
    }

    #[test]
    fn test_trend_is_monotonic_with_fixed_sign() {
        let catalog = catalog();
        let spec = catalog.get(Metric::Wt);
        let mut rng = StdRng::seed_from_u64(2);

        let up: Vec<f64> = (0..5)
            .map(|d| inject(spec, 70.0, d, 5, PatternKind::Trend { sign: 1 }, &mut rng))
            .collect();
        assert!(up.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(up[0], 70.0);
        // 1.0 * 0.2 per day
        assert!((up[4] - 70.8).abs() < 1e-9);

        let down: Vec<f64> = (0..5)
            .map(|d| inject(spec, 70.0, d, 5, PatternKind::Trend { sign: -1 }, &mut rng))
            .collect();
        assert!(down.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_spike_bounds() {
        let catalog = catalog();
        let spec = catalog.get(Metric::Bf);
        let mut rng = StdRng::seed_from_u64(8);
        let mut fired = 0;

        for _ in 0..2000 {
            let v = inject(spec, 25.0, 0, 3, PatternKind::Spike, &mut rng);
            let delta = (v - 25.0).abs();
            if delta > 0.0 {
                fired += 1;
                assert!(delta >= 0.5 - 1e-9 && delta <= 1.0 + 1e-9);
            }
        }
        // ~15 % of 2000
        assert!(fired > 200 && fired < 420, "fired {fired}");
    }

    #[test]
    fn test_noise_bounds() {
        let catalog = catalog();
        let spec = catalog.get(Metric::Dia);
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..500 {
            let v = inject(spec, 80.0, 0, 3, PatternKind::Noise, &mut rng);
            assert!((v - 80.0).abs() <= 5.0 + 1e-9);
        }
    }

    #[test]
    fn test_plan_selects_distinct_metrics() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut counts = [0usize; 4];
        for _ in 0..1000 {
            let plan = plan_variations(&mut rng);
            let n = plan.patterns.len();
            assert!((1..=3).contains(&n));
            counts[n] += 1;

            let mut metrics: Vec<_> = plan.patterns.iter().map(|(m, _)| *m).collect();
            metrics.sort();
            metrics.dedup();
            assert_eq!(metrics.len(), n);

            for (_, p) in &plan.patterns {
                assert_ne!(*p, PatternKind::Noise);
            }
        }
        assert!(counts[1] > counts[2] && counts[2] > counts[3]);
    }

    #[test]
    fn test_apply_plan_rounds_integral_metrics() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(4);
        let values: MetricValues = Metric::ALL.iter().map(|m| (*m, 50.0)).collect();
        let mut samples: Vec<DailySample> = (0..4)
            .map(|i| DailySample {
                values,
                height: 170.0,
                date: NaiveDate::from_ymd_opt(2023, 3, 1 + i).unwrap(),
                day: i + 1,
            })
            .collect();

        let plan = VariationPlan {
            patterns: vec![
                (Metric::Hr, PatternKind::Oscillation),
                (Metric::Bf, PatternKind::Oscillation),
            ],
        };
        apply_plan(&catalog, &plan, &mut samples, &mut rng);

        for s in &samples {
            assert_eq!(s.values.get(Metric::Hr).fract(), 0.0);
            let bf = s.values.get(Metric::Bf);
            assert!(((bf * 100.0).round() - bf * 100.0).abs() < 1e-6);
            assert_eq!(s.values.get(Metric::Wt), 50.0);
        }
        assert_ne!(samples[1].values.get(Metric::Hr), 50.0);
    }
}
