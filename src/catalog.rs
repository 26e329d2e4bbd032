//! Metric catalog
//!
//! Static registry of the ten tracked metrics: codes, display labels, units,
//! expected day-to-day spread and the multipliers used by injection and
//! detection. The catalog is built once and shared read-only.

use serde::{Deserialize, Serialize};

/// Significance multiplier used for codes missing from the catalog
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 2.5;

/// Coefficient-of-variation multiplier used for codes missing from the catalog
pub const DEFAULT_CV_THRESHOLD: f64 = 3.0;

/// Spike magnitude ceiling used for codes missing from the catalog
pub const DEFAULT_SPIKE_MAX_FACTOR: f64 = 1.5;

/// Trend slope factor used for codes missing from the catalog
pub const DEFAULT_TREND_FACTOR: f64 = 0.3;

/// Height is carried on every sample but never perturbed or analysed
pub const HEIGHT_CODE: &str = "ht";
pub const HEIGHT_LABEL: &str = "신장";
pub const HEIGHT_PRECISION: u32 = 1;

/// Tracked metric identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Body fat percentage
    Bf,
    /// Skeletal muscle mass
    Mm,
    /// Body water percentage
    Bw,
    /// Protein percentage
    Prot,
    /// Mineral percentage
    Min,
    /// Body weight
    Wt,
    /// Heart rate
    Hr,
    /// Oxygen saturation
    O2,
    /// Systolic blood pressure
    Sys,
    /// Diastolic blood pressure
    Dia,
}

impl Metric {
    pub const COUNT: usize = 10;

    /// All metrics in record order
    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::Bf,
        Metric::Mm,
        Metric::Bw,
        Metric::Prot,
        Metric::Min,
        Metric::Wt,
        Metric::Hr,
        Metric::O2,
        Metric::Sys,
        Metric::Dia,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Metric::Bf => "bf",
            Metric::Mm => "mm",
            Metric::Bw => "bw",
            Metric::Prot => "prot",
            Metric::Min => "min",
            Metric::Wt => "wt",
            Metric::Hr => "hr",
            Metric::O2 => "o2",
            Metric::Sys => "sys",
            Metric::Dia => "dia",
        }
    }

    pub fn from_code(code: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.code() == code)
    }

    /// Position of this metric in [`Metric::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Vitals are measured as whole numbers
    pub fn is_integral(&self) -> bool {
        matches!(self, Metric::Hr | Metric::O2 | Metric::Sys | Metric::Dia)
    }
}

/// Fixed properties of one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSpec {
    pub metric: Metric,
    /// Korean display label used in commentary
    pub label: &'static str,
    pub unit: &'static str,
    /// Expected day-to-day spread around the subject's baseline
    pub normal_variation: f64,
    /// Multiple of `normal_variation` beyond which a point is anomalous
    pub significance_threshold: f64,
    /// Multiple of the expected CV beyond which a series is anomalous
    pub cv_threshold: f64,
    /// Upper bound of spike magnitude, in multiples of `normal_variation`
    pub spike_max_factor: f64,
    /// Per-day slope of trend injection, in multiples of `normal_variation`
    pub trend_factor: f64,
    /// Decimal places for samples and summary statistics
    pub precision: u32,
}

impl MetricSpec {
    /// Value as shown in commentary and anomaly records: whole numbers for
    /// vitals, one decimal place for everything else.
    pub fn display_value(&self, value: f64) -> f64 {
        if self.metric.is_integral() {
            value.round()
        } else {
            round_to(value, 1)
        }
    }

    /// Round to this metric's sample precision
    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.precision)
    }
}

/// Multipliers resolved for a metric code
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub significance: f64,
    pub cv: f64,
    pub spike_max_factor: f64,
    pub trend_factor: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            significance: DEFAULT_SIGNIFICANCE_THRESHOLD,
            cv: DEFAULT_CV_THRESHOLD,
            spike_max_factor: DEFAULT_SPIKE_MAX_FACTOR,
            trend_factor: DEFAULT_TREND_FACTOR,
        }
    }
}

/// Immutable metric registry
#[derive(Debug, Clone, Serialize)]
pub struct MetricCatalog {
    specs: [MetricSpec; Metric::COUNT],
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl MetricCatalog {
    /// The standard catalog of body-composition and vitals metrics
    pub fn standard() -> Self {
        Self {
            specs: [
                spec(Metric::Bf, "체지방률", "%", 0.5, 2.5, 2.0, 2.0, 0.4, 2),
                spec(Metric::Mm, "근육량", "kg", 0.3, 2.5, 1.5, 1.5, 0.3, 2),
                spec(Metric::Bw, "체수분률", "%", 1.0, 2.5, 2.0, 1.8, 0.4, 2),
                spec(Metric::Prot, "단백질", "%", 0.2, 2.5, 1.5, 1.5, 0.3, 2),
                spec(Metric::Min, "무기질", "%", 0.1, 3.0, 2.0, 1.5, 0.25, 2),
                spec(Metric::Wt, "체중", "kg", 1.0, 2.0, 1.0, 1.5, 0.2, 1),
                spec(Metric::Hr, "심박수", "bpm", 8.0, 2.0, 7.0, 2.0, 0.4, 0),
                spec(Metric::O2, "산소포화도", "%", 1.0, 3.0, 1.5, 1.5, 0.2, 0),
                spec(Metric::Sys, "수축기혈압", "mmHg", 8.0, 2.0, 7.0, 2.0, 0.4, 0),
                spec(Metric::Dia, "이완기혈압", "mmHg", 5.0, 2.0, 6.0, 2.0, 0.4, 0),
            ],
        }
    }

    pub fn get(&self, metric: Metric) -> &MetricSpec {
        &self.specs[metric.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricSpec> {
        self.specs.iter()
    }

    /// Resolve multipliers by raw code, falling back to the documented
    /// defaults for anything the catalog does not know.
    pub fn thresholds_for_code(&self, code: &str) -> Thresholds {
        match Metric::from_code(code) {
            Some(metric) => {
                let spec = self.get(metric);
                Thresholds {
                    significance: spec.significance_threshold,
                    cv: spec.cv_threshold,
                    spike_max_factor: spec.spike_max_factor,
                    trend_factor: spec.trend_factor,
                }
            }
            None => Thresholds::default(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn spec(
    metric: Metric,
    label: &'static str,
    unit: &'static str,
    normal_variation: f64,
    significance_threshold: f64,
    cv_threshold: f64,
    spike_max_factor: f64,
    trend_factor: f64,
    precision: u32,
) -> MetricSpec {
    MetricSpec {
        metric,
        label,
        unit,
        normal_variation,
        significance_threshold,
        cv_threshold,
        spike_max_factor,
        trend_factor,
        precision,
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
