//! Deviation detection
//!
//! Re-derives anomalies from generated samples alone. The detector never
//! sees which metrics were perturbed or how; it only compares samples with
//! the window summary and with each series' own spread.
//!
//! Two passes run in order:
//! 1. Point deviation: a sample further than `normal_variation × significance`
//!    from the window average, and at least 2 % away from it
//! 2. Series variability: a metric whose coefficient of variation exceeds the
//!    CV expected from its normal variation, scaled by the CV multiplier

use crate::catalog::{round_to, Metric, MetricCatalog, MetricSpec};
use crate::narrative::comment_for;
use crate::types::{
    AnomalyKind, AnomalyRecord, DailySample, ObservedRange, SeriesPoint, SummaryStats,
};

/// Smallest percent change reported by the point pass
pub const MIN_PERCENT_CHANGE: i64 = 2;

/// Minimum series length for the variability pass
pub const MIN_VARIABILITY_POINTS: usize = 3;

/// Anomaly paired with the sentence generated for it
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub anomaly: AnomalyRecord,
    pub comment: String,
}

/// Label-blind anomaly detector
pub struct DeviationDetector<'a> {
    catalog: &'a MetricCatalog,
}

impl<'a> DeviationDetector<'a> {
    pub fn new(catalog: &'a MetricCatalog) -> Self {
        Self { catalog }
    }

    /// Run both passes; point deviations come first, then variability
    pub fn detect(&self, samples: &[DailySample], summary: &SummaryStats) -> Vec<Candidate> {
        let Some(range) = ObservedRange::from_samples(samples) else {
            return Vec::new();
        };

        let mut candidates = self.point_deviations(samples, summary, range);
        candidates.extend(self.high_variability(samples, range));
        candidates
    }

    /// Flag individual samples far from the window average
    pub fn point_deviations(
        &self,
        samples: &[DailySample],
        summary: &SummaryStats,
        range: ObservedRange,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for spec in self.catalog.iter() {
            let avg = summary.avg.values.get(spec.metric);
            for point in series_for(spec.metric, samples) {
                if !range.contains(point.date) {
                    continue;
                }
                if let Some(anomaly) = point_anomaly(spec, &point, avg) {
                    self.push(&mut candidates, anomaly);
                }
            }
        }

        candidates
    }

    /// Flag whole series whose spread is larger than expected. The record
    /// carries the date of the most deviant point but no day number.
    pub fn high_variability(&self, samples: &[DailySample], range: ObservedRange) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for spec in self.catalog.iter() {
            let series: Vec<SeriesPoint> = series_for(spec.metric, samples)
                .into_iter()
                .filter(|p| range.contains(p.date))
                .collect();

            if let Some(anomaly) = variability_anomaly(spec, &series) {
                self.push(&mut candidates, anomaly);
            }
        }

        candidates
    }

    fn push(&self, candidates: &mut Vec<Candidate>, anomaly: AnomalyRecord) {
        if let Some(comment) = comment_for(self.catalog, &anomaly) {
            candidates.push(Candidate { anomaly, comment });
        }
    }
}

/// Time series of one metric across the samples, in sample order
pub fn series_for(metric: Metric, samples: &[DailySample]) -> Vec<SeriesPoint> {
    samples
        .iter()
        .map(|s| SeriesPoint {
            day: s.day,
            value: s.values.get(metric),
            date: s.date,
        })
        .collect()
}

/// Directional percent change of `value` relative to `avg`, always
/// non-negative. `None` when no comparison is possible.
pub fn percent_change(value: f64, avg: f64) -> Option<(f64, bool)> {
    if !avg.is_finite() || avg == 0.0 || !value.is_finite() {
        return None;
    }
    let is_higher = value > avg;
    let pct = if is_higher {
        (value / avg - 1.0) * 100.0
    } else {
        (1.0 - value / avg) * 100.0
    };
    Some((pct, is_higher))
}

/// Whether `value` deviates significantly from `avg` for this metric
pub fn is_significant(spec: &MetricSpec, value: f64, avg: f64) -> bool {
    (value - avg).abs() > spec.normal_variation * spec.significance_threshold
}

fn point_anomaly(spec: &MetricSpec, point: &SeriesPoint, avg: f64) -> Option<AnomalyRecord> {
    if !is_significant(spec, point.value, avg) {
        return None;
    }
    let (pct, is_higher) = percent_change(point.value, avg)?;
    let pct = pct.round() as i64;
    if pct < MIN_PERCENT_CHANGE {
        return None;
    }

    Some(AnomalyRecord {
        kind: if is_higher {
            AnomalyKind::SpikeUp
        } else {
            AnomalyKind::SpikeDown
        },
        metric: spec.metric,
        metric_name: spec.label.to_string(),
        day: Some(point.day),
        date: point.date,
        value: spec.display_value(point.value),
        avg_value: Some(avg),
        percent_change: Some(pct),
        cv: None,
    })
}

/// Population coefficient of variation in percent, with the series mean.
/// `None` for fewer than [`MIN_VARIABILITY_POINTS`] points or a
/// non-positive mean.
pub fn coefficient_of_variation(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < MIN_VARIABILITY_POINTS {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if !mean.is_finite() || mean <= 0.0 {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((variance.sqrt() / mean * 100.0, mean))
}

fn variability_anomaly(spec: &MetricSpec, series: &[SeriesPoint]) -> Option<AnomalyRecord> {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let (cv, mean) = coefficient_of_variation(&values)?;

    let expected_cv = (spec.normal_variation / mean) * 100.0 * spec.cv_threshold;
    if cv <= expected_cv {
        return None;
    }

    // First point wins ties
    let mut representative = series[0];
    let mut max_deviation = 0.0;
    for point in series {
        let deviation = (point.value - mean).abs();
        if deviation > max_deviation {
            max_deviation = deviation;
            representative = *point;
        }
    }

    Some(AnomalyRecord {
        kind: AnomalyKind::HighVariability,
        metric: spec.metric,
        metric_name: spec.label.to_string(),
        day: None,
        date: representative.date,
        value: spec.display_value(representative.value),
        avg_value: None,
        percent_change: None,
        cv: Some(round_to(cv, 1)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::summarize;
    use crate::types::MetricValues;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn baseline_values() -> MetricValues {
        let mut v = MetricValues::default();
        v.set(Metric::Bf, 25.4);
        v.set(Metric::Mm, 45.3);
        v.set(Metric::Bw, 55.4);
        v.set(Metric::Prot, 18.1);
        v.set(Metric::Min, 4.5);
        v.set(Metric::Wt, 70.4);
        v.set(Metric::Hr, 75.0);
        v.set(Metric::O2, 98.0);
        v.set(Metric::Sys, 125.0);
        v.set(Metric::Dia, 75.0);
        v
    }

    fn sample(day: u32, edit: impl FnOnce(&mut MetricValues)) -> DailySample {
        let mut values = baseline_values();
        edit(&mut values);
        DailySample {
            values,
            height: 175.0,
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            day,
        }
    }

    fn detect(samples: &[DailySample]) -> Vec<Candidate> {
        let catalog = MetricCatalog::standard();
        let summary = summarize(&catalog, samples).unwrap();
        DeviationDetector::new(&catalog).detect(samples, &summary)
    }

    #[test]
    fn test_heart_rate_below_threshold_is_not_flagged() {
        // avg 77.33, |85 - 77.33| = 7.67 < 8 * 2.0
        let catalog = MetricCatalog::standard();
        let spec = catalog.get(Metric::Hr);
        assert!(!is_significant(spec, 85.0, 77.33));

        let point = SeriesPoint {
            day: 3,
            value: 85.0,
            date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
        };
        assert!(point_anomaly(spec, &point, 77.33).is_none());
    }

    #[test]
    fn test_constant_series_has_zero_cv() {
        let (cv, mean) = coefficient_of_variation(&[70.0, 70.0, 70.0]).unwrap();
        assert_eq!(cv, 0.0);
        assert_eq!(mean, 70.0);

        let samples: Vec<_> = (1..=3).map(|d| sample(d, |_| {})).collect();
        assert!(detect(&samples).is_empty());
    }

    #[test]
    fn test_short_series_skips_variability() {
        assert!(coefficient_of_variation(&[1.0, 100.0]).is_none());
        assert!(coefficient_of_variation(&[0.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_point_spike_up_detected() {
        // hr: 75, 75, 75, 75, 120 -> avg 84, |120 - 84| = 36 > 16
        let samples: Vec<_> = (1..=5)
            .map(|d| {
                sample(d, |v| {
                    if d == 5 {
                        v.set(Metric::Hr, 120.0)
                    }
                })
            })
            .collect();

        let candidates = detect(&samples);
        let spikes: Vec<_> = candidates
            .iter()
            .filter(|c| c.anomaly.kind == AnomalyKind::SpikeUp)
            .collect();
        assert_eq!(spikes.len(), 1);

        let a = &spikes[0].anomaly;
        assert_eq!(a.metric, Metric::Hr);
        assert_eq!(a.day, Some(5));
        assert_eq!(a.value, 120.0);
        assert_eq!(a.avg_value, Some(84.0));
        // 120 / 84 = 1.4286
        assert_eq!(a.percent_change, Some(43));
        assert_eq!(
            spikes[0].comment,
            "1월 5일, 평소에 비해 심박수 수치가 120bpm로, 평소보다 43% 높았습니다."
        );
    }

    #[test]
    fn test_point_spike_down_detected() {
        // wt: 70.4 x4, 60.0 -> avg 68.32 -> rounded 68.3; |60 - 68.3| = 8.3 > 2
        let samples: Vec<_> = (1..=5)
            .map(|d| {
                sample(d, |v| {
                    if d == 2 {
                        v.set(Metric::Wt, 60.0)
                    }
                })
            })
            .collect();

        let candidates = detect(&samples);
        let a = candidates
            .iter()
            .map(|c| &c.anomaly)
            .find(|a| a.kind == AnomalyKind::SpikeDown)
            .unwrap();
        assert_eq!(a.metric, Metric::Wt);
        assert_eq!(a.avg_value, Some(68.3));
        assert_eq!(a.percent_change, Some(12));
    }

    #[test]
    fn test_small_percent_change_is_suppressed() {
        let catalog = MetricCatalog::standard();
        let spec = catalog.get(Metric::Sys);
        // 16.5 above a 2000 average clears 16 but rounds to 1 %
        let point = SeriesPoint {
            day: 1,
            value: 2016.5,
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        };
        assert!(is_significant(spec, 2016.5, 2000.0));
        assert!(point_anomaly(spec, &point, 2000.0).is_none());
    }

    #[test]
    fn test_zero_average_is_skipped() {
        assert!(percent_change(5.0, 0.0).is_none());
        assert!(percent_change(5.0, f64::NAN).is_none());
        let (pct, higher) = percent_change(90.0, 100.0).unwrap();
        assert!(!higher);
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_variability_reports_largest_deviation() {
        // o2 oscillating 90, 99, 90 -> mean 93, sd 4.24, cv 4.56
        // expected = 1 / 93 * 100 * 1.5 = 1.61 -> flagged
        let samples: Vec<_> = [(1, 90.0), (2, 99.0), (3, 90.0)]
            .into_iter()
            .map(|(d, o2)| sample(d, |v| v.set(Metric::O2, o2)))
            .collect();

        let catalog = MetricCatalog::standard();
        let range = ObservedRange::from_samples(&samples).unwrap();
        let candidates = DeviationDetector::new(&catalog).high_variability(&samples, range);

        assert_eq!(candidates.len(), 1);
        let a = &candidates[0].anomaly;
        assert_eq!(a.kind, AnomalyKind::HighVariability);
        assert_eq!(a.metric, Metric::O2);
        assert_eq!(a.day, None);
        assert_eq!(a.date, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
        assert_eq!(a.value, 99.0);
        assert_eq!(a.cv, Some(4.6));
        assert_eq!(
            candidates[0].comment,
            "1월 2일, 산소포화도 수치가 평소보다 크게 변동했습니다(변동계수: 4.6%)."
        );
    }

    #[test]
    fn test_variability_record_has_no_day_key() {
        let samples: Vec<_> = [(1, 98.0), (3, 88.0), (4, 98.0), (5, 88.0)]
            .into_iter()
            .map(|(d, o2)| sample(d, |v| v.set(Metric::O2, o2)))
            .collect();

        let candidates = detect(&samples);
        let variability = candidates
            .iter()
            .find(|c| c.anomaly.kind == AnomalyKind::HighVariability)
            .unwrap();

        let value = serde_json::to_value(&variability.anomaly).unwrap();
        assert!(value.get("day").is_none());
        assert_eq!(value["date"], "2023-01-01T00:00:00");
        assert_eq!(value["metric"], "o2");
    }

    #[test]
    fn test_points_outside_observed_range_are_ignored() {
        let samples: Vec<_> = (1..=5)
            .map(|d| {
                sample(d, |v| {
                    if d == 5 {
                        v.set(Metric::Hr, 140.0)
                    }
                })
            })
            .collect();
        let catalog = MetricCatalog::standard();
        let summary = summarize(&catalog, &samples).unwrap();
        let narrow = ObservedRange {
            first: samples[0].date,
            last: samples[3].date,
        };

        let candidates =
            DeviationDetector::new(&catalog).point_deviations(&samples, &summary, narrow);
        assert!(candidates.iter().all(|c| c.anomaly.day != Some(5)));
    }

    #[test]
    fn test_detection_ignores_injection_labels() {
        // Same samples, same output; detection depends on data only
        let samples: Vec<_> = (1..=4)
            .map(|d| sample(d, |v| v.set(Metric::Bf, 20.0 + d as f64 * 2.0)))
            .collect();
        assert_eq!(detect(&samples), detect(&samples));
    }
}
