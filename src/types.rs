//! Core types for the Vitals Forge pipeline
//!
//! This module defines the data structures that flow through each stage of
//! record generation: observation windows, daily samples, time series points,
//! anomaly records, summary statistics and the emitted record.

use crate::catalog::Metric;
use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Date layout used for every date in the record stream
pub const DATE_FORMAT: &str = "%Y-%m-%dT00:00:00";

/// Dataset flavour a generator produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetProfile {
    /// Injected deviations, detected and narrated
    #[default]
    Anomalous,
    /// Tight day-to-day spread with no anomalies
    Steady,
}

impl DatasetProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetProfile::Anomalous => "anomalous",
            DatasetProfile::Steady => "steady",
        }
    }
}

/// One value per tracked metric, indexed by [`Metric`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricValues([f64; Metric::COUNT]);

impl MetricValues {
    pub fn get(&self, metric: Metric) -> f64 {
        self.0[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        self.0[metric.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.iter().map(move |m| (*m, self.0[m.index()]))
    }
}

impl FromIterator<(Metric, f64)> for MetricValues {
    fn from_iter<I: IntoIterator<Item = (Metric, f64)>>(iter: I) -> Self {
        let mut values = MetricValues::default();
        for (metric, value) in iter {
            values.set(metric, value);
        }
        values
    }
}

/// Per-subject baseline, drawn once per generated record
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectBaseline {
    /// Centre value per metric
    pub values: MetricValues,
    /// Fixed height in cm
    pub height: f64,
}

/// Five-day observation window and the days measured within it
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Unique day offsets from `start`, sorted ascending
    pub day_offsets: Vec<u32>,
}

impl ObservationWindow {
    /// Calendar date of a day offset
    pub fn date_for(&self, offset: u32) -> Option<NaiveDate> {
        self.start
            .checked_add_days(chrono::Days::new(u64::from(offset)))
    }
}

/// One day of measurements
#[derive(Debug, Clone, PartialEq)]
pub struct DailySample {
    pub values: MetricValues,
    pub height: f64,
    pub date: NaiveDate,
    /// 1-based day number within the observation window
    pub day: u32,
}

impl Serialize for DailySample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Metric::COUNT + 2))?;
        write_metric_entries(&mut map, &self.values, self.height)?;
        map.serialize_entry("d", &self.date.format(DATE_FORMAT).to_string())?;
        map.end()
    }
}

/// Single point of a per-metric time series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    /// 1-based day number within the observation window
    pub day: u32,
    pub value: f64,
    pub date: NaiveDate,
}

/// Dates actually covered by generated samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl ObservedRange {
    /// Earliest and latest sample date, or `None` for an empty sample set
    pub fn from_samples(samples: &[DailySample]) -> Option<Self> {
        let first = samples.iter().map(|s| s.date).min()?;
        let last = samples.iter().map(|s| s.date).max()?;
        Some(Self { first, last })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }
}

/// Anomaly classification; serialized with the Korean type names consumers
/// of the record stream expect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyKind {
    #[serde(rename = "급증")]
    SpikeUp,
    #[serde(rename = "급감")]
    SpikeDown,
    #[serde(rename = "큰변동성")]
    HighVariability,
    #[serde(rename = "상승추세")]
    TrendUp,
    #[serde(rename = "하락추세")]
    TrendDown,
}

impl AnomalyKind {
    /// Ranking weight when more anomalies are found than can be reported
    pub fn priority(&self) -> u8 {
        match self {
            AnomalyKind::TrendUp | AnomalyKind::TrendDown => 3,
            AnomalyKind::SpikeUp | AnomalyKind::SpikeDown => 2,
            AnomalyKind::HighVariability => 1,
        }
    }
}

/// Detected (or synthesized) anomaly
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub metric: Metric,
    pub metric_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_number")]
    pub value: f64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub avg_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<i64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub cv: Option<f64>,
}

impl AnomalyRecord {
    /// `"{month}월 {day}일"` token used in commentary
    pub fn month_day(&self) -> String {
        month_day(self.date)
    }
}

/// One row of summary statistics (avg, min or max) over every metric and height
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricTable {
    pub values: MetricValues,
    pub height: f64,
}

impl Serialize for MetricTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Metric::COUNT + 1))?;
        write_metric_entries(&mut map, &self.values, self.height)?;
        map.end()
    }
}

/// Window summary: per-metric average, minimum and maximum
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SummaryStats {
    pub avg: MetricTable,
    pub min: MetricTable,
    pub max: MetricTable,
}

/// Prompt payload embedded in the record input
#[derive(Debug, Clone, Serialize)]
pub struct RecordInput {
    #[serde(serialize_with = "serialize_date")]
    pub ws: NaiveDate,
    #[serde(serialize_with = "serialize_date")]
    pub we: NaiveDate,
    pub dm: Vec<DailySample>,
}

/// Narrative wrapper
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Commentary {
    pub g: String,
}

/// Structured answer of a record
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutput {
    pub wsum: SummaryStats,
    pub anom: Vec<AnomalyRecord>,
    pub cmt: Commentary,
    pub fd: Vec<String>,
}

/// Paired prompt / answer strings, one line of the output stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    pub input: String,
    pub output: String,
}

/// `"{month}월 {day}일"` for a date
pub fn month_day(date: NaiveDate) -> String {
    format!("{}월 {}일", date.month(), date.day())
}

fn write_metric_entries<M: SerializeMap>(
    map: &mut M,
    values: &MetricValues,
    height: f64,
) -> Result<(), M::Error> {
    for (metric, value) in values.iter() {
        map.serialize_entry(metric.code(), &JsNumber(value))?;
        if metric == Metric::Wt {
            map.serialize_entry(crate::catalog::HEIGHT_CODE, &JsNumber(height))?;
        }
    }
    Ok(())
}

/// Number that serializes integral values without a fractional part
struct JsNumber(f64);

impl Serialize for JsNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_number(&self.0, serializer)
    }
}

fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn serialize_opt_number<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serialize_number(v, serializer),
        None => serializer.serialize_none(),
    }
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(DATE_FORMAT))
}
