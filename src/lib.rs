//! Vitals Forge - Synthetic health-metric training records
//!
//! Forge produces paired prompt / answer records over short observation
//! windows of body-composition and vitals measurements through a seeded
//! pipeline: baseline sampling → anomaly injection → summary statistics
//! → label-blind detection → selection and narrative → record encoding.
//!
//! ## Profiles
//!
//! - **Anomalous**: injected deviations, re-detected from the data and narrated
//! - **Steady**: tight day-to-day spread, no anomalies

pub mod baseline;
pub mod catalog;
pub mod config;
pub mod detector;
pub mod encoder;
pub mod error;
pub mod injector;
pub mod narrative;
pub mod pipeline;
pub mod recommend;
pub mod selector;
pub mod sink;
pub mod summary;
pub mod types;

pub use catalog::{Metric, MetricCatalog, MetricSpec};
pub use config::GeneratorConfig;
pub use error::GenerateError;
pub use pipeline::{BatchReport, RecordGenerator};
pub use sink::RecordSink;
pub use types::{DatasetProfile, GeneratedRecord};

/// Crate version, reported by the CLI
pub const FORGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default output file of a batch run
pub const DEFAULT_OUTPUT_PATH: &str = "realistic_health_analysis.jsonl";
