//! Forge CLI - Command-line interface for Vitals Forge
//!
//! Commands:
//! - generate: Write synthetic training records as JSONL
//! - catalog: Print the metric catalog
//! - schema: Describe the record layout

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vitals_forge::catalog::{HEIGHT_CODE, HEIGHT_LABEL, HEIGHT_PRECISION};
use vitals_forge::config::DEFAULT_RECORD_COUNT;
use vitals_forge::encoder::{PROMPT_HEADER, PROMPT_INSTRUCTION};
use vitals_forge::{
    DatasetProfile, GenerateError, GeneratorConfig, MetricCatalog, RecordGenerator, RecordSink,
    DEFAULT_OUTPUT_PATH, FORGE_VERSION,
};

/// Forge - Synthetic health-metric records for model training
#[derive(Parser)]
#[command(name = "forge")]
#[command(version = FORGE_VERSION)]
#[command(about = "Generate synthetic health-metric training records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate records as newline-delimited JSON
    Generate {
        /// Number of records
        #[arg(short, long, default_value_t = DEFAULT_RECORD_COUNT)]
        count: usize,

        /// Random seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        /// Dataset profile
        #[arg(long, default_value = "anomalous")]
        profile: ProfileArg,

        /// Flush output after each record
        #[arg(long)]
        flush: bool,
    },

    /// Print the metric catalog
    Catalog {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum ProfileArg {
    /// Injected anomalies with detection and narrative
    Anomalous,
    /// Tight spread, no anomalies
    Steady,
}

impl From<ProfileArg> for DatasetProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Anomalous => DatasetProfile::Anomalous,
            ProfileArg::Steady => DatasetProfile::Steady,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Prompt payload (ws, we, dm)
    Input,
    /// Answer payload (wsum, anom, cmt, fd)
    Output,
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ForgeCliError> {
    match cli.command {
        Commands::Generate {
            count,
            seed,
            output,
            profile,
            flush,
        } => cmd_generate(count, seed, &output, profile.into(), flush),

        Commands::Catalog { json } => cmd_catalog(json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_generate(
    count: usize,
    seed: Option<u64>,
    output: &Path,
    profile: DatasetProfile,
    flush: bool,
) -> Result<(), ForgeCliError> {
    let mut config = GeneratorConfig::new().with_count(count).with_profile(profile);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let mut generator = RecordGenerator::new(config)?;

    let writer: Box<dyn Write> = if output.to_string_lossy() == "-" {
        Box::new(io::stdout().lock())
    } else {
        Box::new(BufWriter::new(File::create(output)?))
    };
    let mut sink = RecordSink::new(writer).with_flush(flush);

    let report = generator.generate_batch(&mut sink);
    sink.finish()?;

    if output.to_string_lossy() != "-" {
        log::info!("{} records saved to {}", report.written, output.display());
    }

    if report.failed > 0 {
        return Err(ForgeCliError::RecordsFailed(report.failed));
    }

    Ok(())
}

fn cmd_catalog(json: bool) -> Result<(), ForgeCliError> {
    let catalog = MetricCatalog::standard();

    if json {
        let specs: Vec<_> = catalog.iter().collect();
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    println!(
        "{:<6} {:<10} {:<6} {:>6} {:>6} {:>6} {:>7} {:>6} {:>4}",
        "code", "label", "unit", "nv", "sig", "cv", "spike", "trend", "dec"
    );
    for spec in catalog.iter() {
        println!(
            "{:<6} {:<10} {:<6} {:>6} {:>6} {:>6} {:>7} {:>6} {:>4}",
            spec.metric.code(),
            spec.label,
            spec.unit,
            spec.normal_variation,
            spec.significance_threshold,
            spec.cv_threshold,
            spec.spike_max_factor,
            spec.trend_factor,
            spec.precision
        );
    }
    println!(
        "{:<6} {:<10} {:<6} (carried, never analysed; {} decimal)",
        HEIGHT_CODE, HEIGHT_LABEL, "cm", HEIGHT_PRECISION
    );

    Ok(())
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), ForgeCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input: prompt string");
                println!();
                println!("{:?}{{json}}{:?}", PROMPT_HEADER, PROMPT_INSTRUCTION);
                println!();
                println!("where {{json}} contains:");
                println!("- ws: Window start (YYYY-MM-DDT00:00:00)");
                println!("- we: Window end");
                println!("- dm: Daily measurements, each with");
                println!("  - bf, mm, bw, prot, min, wt, ht, hr, o2, sys, dia");
                println!("  - d: Measurement date");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output: answer JSON string");
                println!();
                println!("- wsum: {{ avg, min, max }} per metric and height");
                println!("- anom: Up to 5 anomalies containing:");
                println!("  - type: 급증, 급감, 큰변동성, 상승추세, 하락추세");
                println!("  - metric, metricName, day, date, value");
                println!("  - avgValue, percentChange (point anomalies)");
                println!("  - cv (variability anomalies)");
                println!("- cmt: {{ g }} narrative summary");
                println!("- fd: Meal recommendations");
            }
        }
    }

    Ok(())
}

// Helper functions

fn metric_properties() -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    for spec in MetricCatalog::standard().iter() {
        properties.insert(
            spec.metric.code().to_string(),
            serde_json::json!({ "type": "number", "description": spec.label }),
        );
    }
    properties.insert(
        HEIGHT_CODE.to_string(),
        serde_json::json!({ "type": "number", "description": HEIGHT_LABEL }),
    );
    serde_json::Value::Object(properties)
}

fn get_input_json_schema() -> String {
    let mut sample = metric_properties();
    if let Some(map) = sample.as_object_mut() {
        map.insert(
            "d".to_string(),
            serde_json::json!({ "type": "string", "format": "date-time" }),
        );
    }

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "forge.record_input",
        "description": "Observation window embedded in the prompt",
        "type": "object",
        "required": ["ws", "we", "dm"],
        "properties": {
            "ws": { "type": "string", "format": "date-time" },
            "we": { "type": "string", "format": "date-time" },
            "dm": {
                "type": "array",
                "items": { "type": "object", "properties": sample }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let table = metric_properties();

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "forge.record_output",
        "description": "Structured answer of a training record",
        "type": "object",
        "required": ["wsum", "anom", "cmt", "fd"],
        "properties": {
            "wsum": {
                "type": "object",
                "properties": {
                    "avg": { "type": "object", "properties": table.clone() },
                    "min": { "type": "object", "properties": table.clone() },
                    "max": { "type": "object", "properties": table }
                }
            },
            "anom": {
                "type": "array",
                "maxItems": 5,
                "items": {
                    "type": "object",
                    "required": ["type", "metric", "metricName", "date", "value"],
                    "properties": {
                        "type": { "type": "string", "enum": ["급증", "급감", "큰변동성", "상승추세", "하락추세"] },
                        "metric": { "type": "string" },
                        "metricName": { "type": "string" },
                        "day": { "type": "integer" },
                        "date": { "type": "string", "format": "date-time" },
                        "value": { "type": "number" },
                        "avgValue": { "type": "number" },
                        "percentChange": { "type": "integer" },
                        "cv": { "type": "number" }
                    }
                }
            },
            "cmt": {
                "type": "object",
                "properties": { "g": { "type": "string" } }
            },
            "fd": { "type": "array", "items": { "type": "string" } }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum ForgeCliError {
    Io(io::Error),
    Generate(GenerateError),
    Json(serde_json::Error),
    RecordsFailed(usize),
}

impl From<io::Error> for ForgeCliError {
    fn from(e: io::Error) -> Self {
        ForgeCliError::Io(e)
    }
}

impl From<GenerateError> for ForgeCliError {
    fn from(e: GenerateError) -> Self {
        ForgeCliError::Generate(e)
    }
}

impl From<serde_json::Error> for ForgeCliError {
    fn from(e: serde_json::Error) -> Self {
        ForgeCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ForgeCliError> for CliError {
    fn from(e: ForgeCliError) -> Self {
        match e {
            ForgeCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ForgeCliError::Generate(GenerateError::InvalidConfig(msg)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: msg,
                hint: Some("Run 'forge generate --help' for valid options".to_string()),
            },
            ForgeCliError::Generate(e) => CliError {
                code: "GENERATE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            ForgeCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            ForgeCliError::RecordsFailed(count) => CliError {
                code: "RECORDS_FAILED".to_string(),
                message: format!("{} records could not be written", count),
                hint: Some("Check free disk space and the output path".to_string()),
            },
        }
    }
}
