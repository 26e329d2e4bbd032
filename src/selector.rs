//! Anomaly selection and narrative assembly
//!
//! Turns the detector's candidate list into the final anomaly list and
//! narrative. When nothing was detected the selector falls back to the
//! single largest deviation, and as a last resort to a fixed heart-rate
//! placeholder. When too much was detected it ranks by kind and magnitude
//! and keeps the top entries.
//!
//! Selection is a pure transform over its inputs.

use std::cmp::Ordering;

use crate::catalog::{Metric, MetricCatalog};
use crate::detector::{percent_change, Candidate};
use crate::narrative::{comment_for, compose, dedup_comments};
use crate::types::{
    AnomalyKind, AnomalyRecord, DailySample, ObservationWindow, ObservedRange, SummaryStats,
};

/// Default number of anomalies kept per record
pub const DEFAULT_MAX_ANOMALIES: usize = 5;

/// Heart-rate average assumed by the placeholder when none is available
const PLACEHOLDER_AVERAGE: f64 = 70.0;

/// Percent reported by the placeholder anomaly
const PLACEHOLDER_PERCENT: i64 = 5;

/// Final anomaly list and narrative of one record
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub anomalies: Vec<AnomalyRecord>,
    pub narrative: String,
}

/// Ranks, caps and narrates detected anomalies
pub struct AnomalySelector<'a> {
    catalog: &'a MetricCatalog,
    max_anomalies: usize,
}

impl<'a> AnomalySelector<'a> {
    pub fn new(catalog: &'a MetricCatalog, max_anomalies: usize) -> Self {
        Self {
            catalog,
            max_anomalies,
        }
    }

    /// Build the final selection for one record
    pub fn select(
        &self,
        candidates: Vec<Candidate>,
        samples: &[DailySample],
        summary: &SummaryStats,
        window: &ObservationWindow,
    ) -> Selection {
        let candidates = if candidates.is_empty() {
            let fallback = self
                .largest_deviation(samples, summary)
                .unwrap_or_else(|| self.placeholder(samples, summary, window));
            vec![fallback]
        } else {
            candidates
        };

        let (mut anomalies, mut comments): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .map(|c| (c.anomaly, c.comment))
            .unzip();

        if anomalies.len() > self.max_anomalies {
            log::debug!(
                "capping {} anomalies to {}",
                anomalies.len(),
                self.max_anomalies
            );
            rank(&mut anomalies);
            anomalies.truncate(self.max_anomalies);
            comments = self.rebuild_comments(&anomalies, &comments);
        }

        let comments = dedup_comments(comments);
        let narrative = compose(anomalies.len(), &comments);

        Selection {
            anomalies,
            narrative,
        }
    }

    /// Largest directional percent deviation from the window average over
    /// every metric and sample in the observed range.
    ///
    /// The record's `day` is the 1-based position of the sample among the
    /// samples in range, not its offset within the window.
    pub fn largest_deviation(
        &self,
        samples: &[DailySample],
        summary: &SummaryStats,
    ) -> Option<Candidate> {
        let range = ObservedRange::from_samples(samples)?;

        let mut best: Option<(f64, bool, Metric, usize, &DailySample)> = None;
        for spec in self.catalog.iter() {
            let avg = summary.avg.values.get(spec.metric);
            let valid = samples.iter().filter(|s| range.contains(s.date));
            for (position, sample) in valid.enumerate() {
                let value = sample.values.get(spec.metric);
                if value == 0.0 {
                    continue;
                }
                let Some((pct, is_higher)) = percent_change(value, avg) else {
                    continue;
                };
                if best.map_or(true, |(max, ..)| pct > max) {
                    best = Some((pct, is_higher, spec.metric, position, sample));
                }
            }
        }

        let (pct, is_higher, metric, position, sample) = best?;
        let spec = self.catalog.get(metric);
        let anomaly = AnomalyRecord {
            kind: if is_higher {
                AnomalyKind::SpikeUp
            } else {
                AnomalyKind::SpikeDown
            },
            metric,
            metric_name: spec.label.to_string(),
            day: u32::try_from(position + 1).ok(),
            date: sample.date,
            value: spec.display_value(sample.values.get(metric)),
            avg_value: Some(summary.avg.values.get(metric)),
            percent_change: Some(pct.round() as i64),
            cv: None,
        };
        log::debug!(
            "no anomaly detected, falling back to largest deviation on {}",
            metric.code()
        );

        let comment = comment_for(self.catalog, &anomaly)?;
        Some(Candidate { anomaly, comment })
    }

    /// Fixed heart-rate anomaly used when no deviation can be computed
    pub fn placeholder(
        &self,
        samples: &[DailySample],
        summary: &SummaryStats,
        window: &ObservationWindow,
    ) -> Candidate {
        let spec = self.catalog.get(Metric::Hr);
        let avg = match summary.avg.values.get(Metric::Hr) {
            a if a.is_finite() && a != 0.0 => a,
            _ => PLACEHOLDER_AVERAGE,
        };
        let date = samples.first().map_or(window.start, |s| s.date);

        log::warn!(
            "degenerate window starting {}: emitting heart-rate placeholder anomaly",
            window.start
        );

        let anomaly = AnomalyRecord {
            kind: AnomalyKind::SpikeUp,
            metric: Metric::Hr,
            metric_name: spec.label.to_string(),
            day: Some(1),
            date,
            value: (avg * 1.05).round(),
            avg_value: Some(avg),
            percent_change: Some(PLACEHOLDER_PERCENT),
            cv: None,
        };
        let comment = comment_for(self.catalog, &anomaly).unwrap_or_default();
        Candidate { anomaly, comment }
    }

    /// One comment per kept anomaly, reusing an existing comment that
    /// mentions the same date and metric label
    fn rebuild_comments(&self, anomalies: &[AnomalyRecord], comments: &[String]) -> Vec<String> {
        anomalies
            .iter()
            .filter_map(|anomaly| {
                let date_token = anomaly.month_day();
                let label = self.catalog.get(anomaly.metric).label;
                comments
                    .iter()
                    .find(|c| c.contains(&date_token) && c.contains(label))
                    .cloned()
                    .or_else(|| comment_for(self.catalog, anomaly))
            })
            .collect()
    }
}

/// Stable sort: kind priority, then percent change, then CV, all descending
pub fn rank(anomalies: &mut [AnomalyRecord]) {
    anomalies.sort_by(compare_importance);
}

fn compare_importance(a: &AnomalyRecord, b: &AnomalyRecord) -> Ordering {
    b.kind
        .priority()
        .cmp(&a.kind.priority())
        .then_with(|| match (a.percent_change, b.percent_change) {
            (Some(pa), Some(pb)) => pb.cmp(&pa),
            _ => match (a.cv, b.cv) {
                (Some(ca), Some(cb)) => cb.partial_cmp(&ca).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        })
}
