//! Pipeline orchestration
//!
//! This module provides the public API for Vitals Forge.
//! It drives one record through every stage, from baseline sampling to the
//! encoded prompt / answer pair, and batches records into a sink.

use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::baseline::{draw_baseline, draw_daily_samples, draw_window, ProfileParams};
use crate::catalog::{Metric, MetricCatalog};
use crate::config::GeneratorConfig;
use crate::detector::DeviationDetector;
use crate::encoder::RecordEncoder;
use crate::error::GenerateError;
use crate::injector::{apply_plan, plan_variations};
use crate::narrative::STEADY_NARRATIVE;
use crate::recommend::{first_meals, meal_pool, recommend};
use crate::selector::AnomalySelector;
use crate::sink::RecordSink;
use crate::summary::summarize;
use crate::types::{
    AnomalyKind, AnomalyRecord, DailySample, DatasetProfile, GeneratedRecord, MetricTable,
    MetricValues, ObservationWindow, RecordInput, RecordOutput, SummaryStats,
};

/// Records between progress log lines
pub const PROGRESS_INTERVAL: usize = 100;

/// Outcome of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub requested: usize,
    pub written: usize,
    pub failed: usize,
}

/// Seedable record generator.
///
/// Owns the random generator; every draw of every stage goes through it, so
/// two generators built with the same seed emit identical records.
pub struct RecordGenerator {
    config: GeneratorConfig,
    catalog: Arc<MetricCatalog>,
    params: ProfileParams,
    encoder: RecordEncoder,
    rng: StdRng,
}

impl RecordGenerator {
    /// Create a generator with the standard metric catalog
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        Self::with_catalog(config, Arc::new(MetricCatalog::standard()))
    }

    /// Create a generator sharing an existing catalog
    pub fn with_catalog(
        config: GeneratorConfig,
        catalog: Arc<MetricCatalog>,
    ) -> Result<Self, GenerateError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            params: ProfileParams::for_profile(config.profile),
            config,
            catalog,
            encoder: RecordEncoder::new(),
            rng,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Generate the typed prompt and answer payloads of one record
    pub fn generate_parts(&mut self) -> Result<(RecordInput, RecordOutput), GenerateError> {
        let catalog = &self.catalog;
        let rng = &mut self.rng;

        let baseline = draw_baseline(&self.params, rng);
        let window = draw_window(&self.params, rng)?;
        let mut samples = draw_daily_samples(catalog, &self.params, &baseline, &window, rng)?;

        let (summary, anomalies, narrative) = match self.config.profile {
            DatasetProfile::Anomalous => {
                let plan = plan_variations(rng);
                log::debug!("variation plan: {:?}", plan.patterns);
                apply_plan(catalog, &plan, &mut samples, rng);

                let summary = summarize(catalog, &samples)?;
                let candidates = DeviationDetector::new(catalog).detect(&samples, &summary);
                let selection = AnomalySelector::new(catalog, self.config.max_anomalies)
                    .select(candidates, &samples, &summary, &window);
                (summary, selection.anomalies, selection.narrative)
            }
            DatasetProfile::Steady => {
                let summary = summarize(catalog, &samples)?;
                (summary, Vec::new(), STEADY_NARRATIVE.to_string())
            }
        };

        let pool = meal_pool(self.config.profile);
        let meals = recommend(rng, pool, self.config.recommend_count);

        Ok(self
            .encoder
            .assemble(&window, samples, summary, anomalies, narrative, meals))
    }

    /// Generate and encode one record
    pub fn generate_record(&mut self) -> Result<GeneratedRecord, GenerateError> {
        let (input, output) = self.generate_parts()?;
        self.encoder.encode(&input, &output)
    }

    /// Generate one record, substituting the fixed fallback record when
    /// generation fails
    pub fn generate_or_fallback(&mut self) -> Result<GeneratedRecord, GenerateError> {
        match self.generate_record() {
            Ok(record) => Ok(record),
            Err(e) => {
                log::error!("record generation failed, emitting fallback record: {e}");
                let (input, output) = fallback_parts(self.config.recommend_count);
                self.encoder.encode(&input, &output)
            }
        }
    }

    /// Generate `config.count` records into the sink.
    ///
    /// Per-record failures are logged and counted; the batch always runs to
    /// completion.
    pub fn generate_batch<W: Write>(&mut self, sink: &mut RecordSink<W>) -> BatchReport {
        let requested = self.config.count;
        let mut failed = 0;

        log::info!(
            "generating {} {} records",
            requested,
            self.config.profile.as_str()
        );

        for i in 0..requested {
            let written = self
                .generate_or_fallback()
                .and_then(|record| sink.write_record(&record));
            if let Err(e) = written {
                log::error!("record {i} was not written: {e}");
                failed += 1;
            }

            if i % PROGRESS_INTERVAL == 0 {
                log::info!("{i}/{requested} records generated");
            }
        }

        let report = BatchReport {
            requested,
            written: sink.written(),
            failed,
        };
        log::info!(
            "batch complete: {} written, {} failed",
            report.written,
            report.failed
        );
        report
    }
}

/// Fixed record emitted in place of one whose generation failed
pub fn fallback_parts(recommend_count: usize) -> (RecordInput, RecordOutput) {
    let day = |d: u32| NaiveDate::from_ymd_opt(2023, 1, d).unwrap_or_default();
    let values = |v: [f64; Metric::COUNT]| -> MetricValues {
        Metric::ALL.into_iter().zip(v).collect()
    };
    let table = |v: [f64; Metric::COUNT]| MetricTable {
        values: values(v),
        height: 175.0,
    };
    let sample = |d: u32, v: [f64; Metric::COUNT]| DailySample {
        values: values(v),
        height: 175.0,
        date: day(d),
        day: d,
    };

    let window = ObservationWindow {
        start: day(1),
        end: day(5),
        day_offsets: vec![0, 2, 4],
    };
    let samples = vec![
        sample(1, [25.5, 45.2, 55.3, 18.1, 4.5, 70.5, 72.0, 98.0, 125.0, 75.0]),
        sample(3, [25.3, 45.3, 55.4, 18.2, 4.5, 70.3, 85.0, 98.0, 124.0, 76.0]),
        sample(5, [25.4, 45.4, 55.5, 18.0, 4.4, 70.4, 75.0, 97.0, 126.0, 74.0]),
    ];
    let summary = SummaryStats {
        avg: table([25.4, 45.3, 55.4, 18.1, 4.47, 70.4, 77.33, 97.67, 125.0, 75.0]),
        min: table([25.3, 45.2, 55.3, 18.0, 4.4, 70.3, 72.0, 97.0, 124.0, 74.0]),
        max: table([25.5, 45.4, 55.5, 18.2, 4.5, 70.5, 85.0, 98.0, 126.0, 76.0]),
    };
    let anomaly = AnomalyRecord {
        kind: AnomalyKind::SpikeUp,
        metric: Metric::Hr,
        metric_name: "심박수".to_string(),
        day: Some(2),
        date: day(3),
        value: 85.0,
        avg_value: Some(77.33),
        percent_change: Some(10),
        cv: None,
    };
    let narrative = "측정 기간 동안 1개의 특이사항이 발견되었습니다. \
                     1월 3일, 평소에 비해 심박수 수치가 85bpm로, 평소보다 10% 높았습니다."
        .to_string();

    RecordEncoder::new().assemble(
        &window,
        samples,
        summary,
        vec![anomaly],
        narrative,
        first_meals(recommend_count),
    )
}
