//! Baseline sampling
//!
//! This module draws the per-subject baseline for every metric, the
//! observation window, and the noisy daily samples around the baseline.
//! Every draw goes through the caller's random generator.

use crate::catalog::{round_to, Metric, MetricCatalog, MetricSpec, HEIGHT_PRECISION};
use crate::error::GenerateError;
use crate::types::{DailySample, DatasetProfile, MetricValues, ObservationWindow, SubjectBaseline};
use chrono::NaiveDate;
use rand::seq::index;
use rand::Rng;

/// Days in an observation window; measurement offsets are `0..WINDOW_DAYS`
pub const WINDOW_DAYS: u32 = 5;

/// Inclusive `(low, high, decimals)` range for a baseline draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineRange {
    pub low: f64,
    pub high: f64,
    pub decimals: u32,
}

fn range(low: f64, high: f64, decimals: u32) -> BaselineRange {
    BaselineRange {
        low,
        high,
        decimals,
    }
}

const HEIGHT_RANGE: BaselineRange = BaselineRange {
    low: 155.0,
    high: 190.0,
    decimals: HEIGHT_PRECISION,
};
const WEIGHT_RANGE: BaselineRange = BaselineRange {
    low: 50.0,
    high: 85.0,
    decimals: 1,
};

/// Sampling parameters for a dataset profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileParams {
    /// Baseline range per metric, indexed like [`Metric::ALL`]
    pub baselines: [BaselineRange; Metric::COUNT],
    /// Daily spread per metric; `None` uses the catalog's normal variation
    pub spreads: Option<[f64; Metric::COUNT]>,
    /// Inclusive range of measured days per window
    pub min_days: u32,
    pub max_days: u32,
    /// Days between `ws` and `we`
    pub window_span: u32,
}

impl ProfileParams {
    pub fn for_profile(profile: DatasetProfile) -> Self {
        match profile {
            DatasetProfile::Anomalous => Self {
                baselines: [
                    range(18.0, 35.0, 2),
                    range(35.0, 55.0, 2),
                    range(45.0, 65.0, 2),
                    range(15.0, 22.0, 2),
                    range(3.5, 6.0, 2),
                    WEIGHT_RANGE,
                    range(55.0, 95.0, 1),
                    range(94.0, 99.0, 1),
                    range(100.0, 145.0, 1),
                    range(65.0, 95.0, 1),
                ],
                spreads: None,
                min_days: 3,
                max_days: 5,
                window_span: 5,
            },
            DatasetProfile::Steady => Self {
                baselines: [
                    range(18.0, 27.0, 2),
                    range(42.0, 48.0, 2),
                    range(50.0, 56.0, 2),
                    range(17.0, 20.0, 2),
                    range(4.0, 5.0, 2),
                    WEIGHT_RANGE,
                    range(55.0, 75.0, 1),
                    range(96.0, 99.0, 1),
                    range(110.0, 135.0, 1),
                    range(70.0, 85.0, 1),
                ],
                spreads: Some([0.3, 0.3, 0.3, 0.2, 0.1, 0.5, 2.0, 1.0, 2.0, 2.0]),
                min_days: 1,
                max_days: 5,
                window_span: 4,
            },
        }
    }

    /// Daily spread used for a metric under this profile
    pub fn spread(&self, spec: &MetricSpec) -> f64 {
        match &self.spreads {
            Some(spreads) => spreads[spec.metric.index()],
            None => spec.normal_variation,
        }
    }
}

/// Uniform draw in `[low, high)` rounded to `decimals`
pub fn random_in_range<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64, decimals: u32) -> f64 {
    let raw = if high > low {
        rng.gen_range(low..high)
    } else {
        low
    };
    round_to(raw, decimals)
}

/// Draw one subject's baseline for every metric plus height
pub fn draw_baseline<R: Rng + ?Sized>(params: &ProfileParams, rng: &mut R) -> SubjectBaseline {
    let height = random_in_range(rng, HEIGHT_RANGE.low, HEIGHT_RANGE.high, HEIGHT_RANGE.decimals);
    let values = Metric::ALL
        .iter()
        .map(|m| {
            let r = params.baselines[m.index()];
            (*m, random_in_range(rng, r.low, r.high, r.decimals))
        })
        .collect();

    SubjectBaseline { values, height }
}

/// Draw the observation window and the measured day offsets
pub fn draw_window<R: Rng + ?Sized>(
    params: &ProfileParams,
    rng: &mut R,
) -> Result<ObservationWindow, GenerateError> {
    let year = 2022 + rng.gen_range(0..4);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);

    let start = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| GenerateError::DateOutOfRange(format!("{year}-{month}-{day}")))?;
    let end = start
        .checked_add_days(chrono::Days::new(u64::from(params.window_span)))
        .ok_or_else(|| GenerateError::DateOutOfRange(start.to_string()))?;

    let count = rng.gen_range(params.min_days..=params.max_days.min(WINDOW_DAYS));
    let day_offsets = select_days(rng, count);

    Ok(ObservationWindow {
        start,
        end,
        day_offsets,
    })
}

/// Pick `count` distinct day offsets from the window, sorted ascending
pub fn select_days<R: Rng + ?Sized>(rng: &mut R, count: u32) -> Vec<u32> {
    let count = count.min(WINDOW_DAYS) as usize;
    let mut days: Vec<u32> = index::sample(rng, WINDOW_DAYS as usize, count)
        .into_iter()
        .map(|i| i as u32)
        .collect();
    days.sort_unstable();
    days
}

/// Draw one noisy sample around `baseline`, rounded to the metric precision
pub fn draw_sample<R: Rng + ?Sized>(
    spec: &MetricSpec,
    baseline: f64,
    spread: f64,
    rng: &mut R,
) -> f64 {
    random_in_range(rng, baseline - spread, baseline + spread, spec.precision)
}

/// Draw the unperturbed daily samples for every measured day
pub fn draw_daily_samples<R: Rng + ?Sized>(
    catalog: &MetricCatalog,
    params: &ProfileParams,
    baseline: &SubjectBaseline,
    window: &ObservationWindow,
    rng: &mut R,
) -> Result<Vec<DailySample>, GenerateError> {
    if window.day_offsets.is_empty() {
        return Err(GenerateError::EmptyWindow);
    }

    let mut samples = Vec::with_capacity(window.day_offsets.len());
    for &offset in &window.day_offsets {
        let date = window
            .date_for(offset)
            .ok_or_else(|| GenerateError::DateOutOfRange(window.start.to_string()))?;

        let values: MetricValues = catalog
            .iter()
            .map(|spec| {
                let spread = params.spread(spec);
                let value = draw_sample(spec, baseline.values.get(spec.metric), spread, rng);
                (spec.metric, value)
            })
            .collect();

        samples.push(DailySample {
            values,
            height: baseline.height,
            date,
            day: offset + 1,
        });
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_in_range_bounds_and_precision() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = random_in_range(&mut rng, 3.5, 6.0, 2);
            assert!((3.5..=6.0).contains(&v));
            assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_select_days_sorted_unique() {
        let mut rng = StdRng::seed_from_u64(11);
        for count in 1..=5 {
            let days = select_days(&mut rng, count);
            assert_eq!(days.len(), count as usize);
            assert!(days.windows(2).all(|w| w[0] < w[1]));
            assert!(days.iter().all(|d| *d < WINDOW_DAYS));
        }
    }

    #[test]
    fn test_window_span_per_profile() {
        let mut rng = StdRng::seed_from_u64(3);
        let anomalous = ProfileParams::for_profile(DatasetProfile::Anomalous);
        let steady = ProfileParams::for_profile(DatasetProfile::Steady);

        for _ in 0..200 {
            let w = draw_window(&anomalous, &mut rng).unwrap();
            assert_eq!((w.end - w.start).num_days(), 5);
            assert!((3..=5).contains(&w.day_offsets.len()));

            let w = draw_window(&steady, &mut rng).unwrap();
            assert_eq!((w.end - w.start).num_days(), 4);
            assert!((1..=5).contains(&w.day_offsets.len()));
        }
    }

    #[test]
    fn test_samples_stay_near_baseline() {
        let catalog = MetricCatalog::standard();
        let params = ProfileParams::for_profile(DatasetProfile::Anomalous);
        let mut rng = StdRng::seed_from_u64(42);

        let baseline = draw_baseline(&params, &mut rng);
        let window = draw_window(&params, &mut rng).unwrap();
        let samples = draw_daily_samples(&catalog, &params, &baseline, &window, &mut rng).unwrap();

        assert_eq!(samples.len(), window.day_offsets.len());
        for sample in &samples {
            assert!(sample.date >= window.start && sample.date <= window.end);
            assert_eq!(sample.height, baseline.height);
            for spec in catalog.iter() {
                let v = sample.values.get(spec.metric);
                let b = baseline.values.get(spec.metric);
                // Integral metrics may round up to half a unit past the spread
                assert!((v - b).abs() <= spec.normal_variation + 0.5 + 1e-9);
                if spec.metric.is_integral() {
                    assert_eq!(v.fract(), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_empty_window_is_rejected() {
        let catalog = MetricCatalog::standard();
        let params = ProfileParams::for_profile(DatasetProfile::Steady);
        let mut rng = StdRng::seed_from_u64(1);
        let baseline = draw_baseline(&params, &mut rng);
        let window = ObservationWindow {
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            day_offsets: vec![],
        };

        let result = draw_daily_samples(&catalog, &params, &baseline, &window, &mut rng);
        assert!(matches!(result, Err(GenerateError::EmptyWindow)));
    }
}
