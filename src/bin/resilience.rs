//! Resilience CLI - Command-line interface for Resilience Flux
//!
//! Commands:
//! - score: Score journal records and emit a resilience report
//! - classify: Label each record as challenge, recovery or neutral
//! - validate: Validate raw record schema
//! - doctor: Diagnose configuration and environment
//! - schema: Print input/output schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use resilience_flux::encoder::REPORT_VERSION;
use resilience_flux::pipeline::ResilienceProcessor;
use resilience_flux::schema::{RawRecord, RecordAdapter, SCHEMA_VERSION};
use resilience_flux::types::{ClassifiedRecord, EntryLabel, ResilienceReport};
use resilience_flux::{ResilienceError, ScoringConfig, PRODUCER_NAME, RESILIENCE_VERSION};

/// Resilience - Recovery resilience scoring for journal records
#[derive(Parser)]
#[command(name = "resilience")]
#[command(version = RESILIENCE_VERSION)]
#[command(about = "Score how quickly setbacks turn into recoveries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score records and write a resilience report
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "auto")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,

        /// Scoring configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Classify records without scoring them
    Classify {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "auto")]
        input_format: InputFormat,

        /// Scoring configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output one JSON object per record instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate raw record schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "auto")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a scoring configuration file
        #[arg(long)]
        config: Option<PathBuf>,

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
enum InputFormat {
    /// Detect array or NDJSON from the first character
    Auto,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
    /// Human-readable summary
    Text,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (journal.record.v1)
    Input,
    /// Output schema (resilience report)
    Output,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), ResilienceCliError> {
    match cli.command {
        Commands::Score {
            input,
            output,
            input_format,
            output_format,
            config,
        } => cmd_score(&input, &output, input_format, output_format, config.as_deref()),

        Commands::Classify {
            input,
            input_format,
            config,
            json,
        } => cmd_classify(&input, input_format, config.as_deref(), json),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema { schema_type, json_schema } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_score(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
) -> Result<(), ResilienceCliError> {
    let processor = load_processor(config)?;
    let records = read_records(input, &input_format)?;

    if records.is_empty() {
        return Err(ResilienceCliError::NoRecords);
    }

    let report = processor.process_raw(&records);
    info!(
        score = report.result.score,
        resilience_level = report.result.level.as_str(),
        "scored records"
    );

    let output_data = format_report(&report, &output_format)?;

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_classify(
    input: &Path,
    input_format: InputFormat,
    config: Option<&Path>,
    json: bool,
) -> Result<(), ResilienceCliError> {
    let processor = load_processor(config)?;
    let raw = read_records(input, &input_format)?;
    let conversion = RecordAdapter::to_records(&raw, processor.config().confidence_scale);
    let classified = processor.classify(&conversion.records);

    if json {
        for entry in &classified {
            println!("{}", serde_json::to_string(&ClassifiedLine::from(entry))?);
        }
    } else {
        println!("{:<25} {:<10} {:<10} {}", "CREATED_AT", "LABEL", "TIER", "ID");
        for entry in &classified {
            let line = ClassifiedLine::from(entry);
            println!(
                "{:<25} {:<10} {:<10} {}",
                line.created_at,
                label_str(line.label),
                line.tier.unwrap_or("-"),
                line.id
            );
        }
        if !conversion.skipped.is_empty() {
            println!("\n{} record(s) skipped; run 'resilience validate' for details", conversion.skipped.len());
        }
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), ResilienceCliError> {
    let records = read_records(input, &input_format)?;
    let results = RecordAdapter::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - results.len(),
        invalid_records: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                record_id: r.record_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Record {} (index {}): {}",
                    err.record_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(ResilienceCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), ResilienceCliError> {
    let mut checks: Vec<DoctorCheck> = vec![
        DoctorCheck {
            name: "version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Resilience Flux version {}", RESILIENCE_VERSION),
        },
        DoctorCheck {
            name: "schema_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Input schema: {}, report version {}", SCHEMA_VERSION, REPORT_VERSION),
        },
    ];

    match config {
        Some(path) if !path.exists() => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Config file does not exist; defaults will be used".to_string(),
        }),
        Some(path) => {
            let check = match fs::read_to_string(path) {
                Ok(content) => match ScoringConfig::from_json(&content) {
                    Ok(cfg) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid ({}-day window, baseline {})",
                            cfg.window_days, cfg.baseline
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            };
            checks.push(check);
        }
        None => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "No config given; using defaults".to_string(),
        }),
    }

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (pass --input to score a file)"
    } else {
        "stdin is a pipe (ready to read records)"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: RESILIENCE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Resilience Doctor Report");
        println!("========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ResilienceCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), ResilienceCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("A JSON array or NDJSON stream of journal records:");
                println!();
                println!("- id: string or number (optional, defaults to record-<index>)");
                println!("- created_at: RFC 3339 timestamp (required; naive times read as UTC)");
                println!("- content: free text scanned for setback/recovery keywords");
                println!("- mood, category: legacy labels");
                println!("- sentiment: {{ primary_mood, business_category, confidence }}");
                println!("  sentiment fields take precedence over the legacy labels");
                println!("  confidence may be 0-1 or 0-100 (see confidence_scale)");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: resilience report v{}", REPORT_VERSION);
                println!();
                println!("- report_version: Schema version");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- provenance: {{ record_count, first/last_record_at_utc, computed_at_utc }}");
                println!("- quality: {{ coverage, skipped_records, flags }}");
                println!("- summary: challenge/recovery counts by tier");
                println!("- result:");
                println!("  - score (0-100), level (High, Good, Moderate, Low, Unknown)");
                println!("  - average_recovery_hours, trend (up, down, neutral), trend_percent");
                println!("  - total_challenges, successful_recoveries, recovery_periods");
                println!("  - breakdown: {{ success_rate, severity_handling, recovery_quality, trend_consistency }}");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, ResilienceCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_records(input: &Path, format: &InputFormat) -> Result<Vec<RawRecord>, ResilienceCliError> {
    let data = read_input(input)?;
    let records = match format {
        InputFormat::Auto => RecordAdapter::parse_any(&data)?,
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(&data)?,
        InputFormat::Json => RecordAdapter::parse_array(&data)?,
    };
    debug!(records = records.len(), "read input");
    Ok(records)
}

fn load_processor(config: Option<&Path>) -> Result<ResilienceProcessor, ResilienceCliError> {
    match config {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(ResilienceProcessor::from_config_json(&json)?)
        }
        None => Ok(ResilienceProcessor::new()),
    }
}

fn format_report(report: &ResilienceReport, format: &OutputFormat) -> Result<String, ResilienceCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            let result = &report.result;
            let mut lines = vec![
                format!("Resilience score: {} ({})", result.score, result.level.as_str()),
                format!(
                    "Recoveries:       {} of {} challenges",
                    result.successful_recoveries, result.total_challenges
                ),
                format!("Avg recovery:     {:.1}h", result.average_recovery_hours),
                format!("Trend:            {:?} ({:+.1}%)", result.trend, result.trend_percent),
            ];
            if !report.quality.flags.is_empty() {
                lines.push(format!("Flags:            {}", report.quality.flags.join(", ")));
            }
            Ok(lines.join("\n"))
        }
    }
}

fn label_str(label: EntryLabel) -> &'static str {
    match label {
        EntryLabel::Challenge => "challenge",
        EntryLabel::Recovery => "recovery",
        EntryLabel::Neutral => "neutral",
    }
}

// Error types

#[derive(Debug)]
enum ResilienceCliError {
    Io(io::Error),
    Parse(ResilienceError),
    Json(serde_json::Error),
    NoRecords,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for ResilienceCliError {
    fn from(e: io::Error) -> Self {
        ResilienceCliError::Io(e)
    }
}

impl From<ResilienceError> for ResilienceCliError {
    fn from(e: ResilienceError) -> Self {
        ResilienceCliError::Parse(e)
    }
}

impl From<serde_json::Error> for ResilienceCliError {
    fn from(e: serde_json::Error) -> Self {
        ResilienceCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ResilienceCliError> for CliError {
    fn from(e: ResilienceCliError) -> Self {
        match e {
            ResilienceCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ResilienceCliError::Parse(ResilienceError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'resilience doctor --config <file>' for details".to_string()),
            },
            ResilienceCliError::Parse(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches {} schema", SCHEMA_VERSION)),
            },
            ResilienceCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ResilienceCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            ResilienceCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            ResilienceCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ClassifiedLine<'a> {
    id: &'a str,
    created_at: String,
    label: EntryLabel,
    tier: Option<&'static str>,
    is_challenge: bool,
    is_recovery: bool,
}

impl<'a> From<&'a ClassifiedRecord> for ClassifiedLine<'a> {
    fn from(entry: &'a ClassifiedRecord) -> Self {
        let tier = match entry.label() {
            EntryLabel::Challenge => entry.challenge_severity.map(|s| s.as_str()),
            EntryLabel::Recovery => entry.recovery_strength.map(|s| s.as_str()),
            EntryLabel::Neutral => None,
        };
        ClassifiedLine {
            id: &entry.record.id,
            created_at: entry.record.created_at.to_rfc3339(),
            label: entry.label(),
            tier,
            is_challenge: entry.is_challenge,
            is_recovery: entry.is_recovery,
        }
    }
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    record_id: Option<String>,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "Journal record accepted by the resilience scorer",
        "type": "object",
        "required": ["created_at"],
        "properties": {
            "id": { "type": ["string", "integer"] },
            "created_at": { "type": "string", "format": "date-time" },
            "content": { "type": "string" },
            "mood": { "type": "string" },
            "category": { "type": "string" },
            "sentiment": {
                "type": "object",
                "properties": {
                    "primary_mood": { "type": "string" },
                    "business_category": { "type": "string" },
                    "confidence": { "type": "number", "minimum": 0 }
                }
            }
        }
    }).to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "resilience.report",
        "description": "Resilience report produced by resilience-flux",
        "type": "object",
        "required": ["report_version", "producer", "provenance", "quality", "summary", "result"],
        "properties": {
            "report_version": { "type": "string", "const": REPORT_VERSION },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "provenance": {
                "type": "object",
                "properties": {
                    "record_count": { "type": "integer" },
                    "first_record_at_utc": { "type": ["string", "null"] },
                    "last_record_at_utc": { "type": ["string", "null"] },
                    "computed_at_utc": { "type": "string" }
                }
            },
            "quality": {
                "type": "object",
                "properties": {
                    "coverage": { "type": "number" },
                    "skipped_records": { "type": "integer" },
                    "flags": { "type": "array", "items": { "type": "string" } }
                }
            },
            "summary": { "type": "object" },
            "result": {
                "type": "object",
                "required": ["score", "level", "average_recovery_hours", "trend", "trend_percent"],
                "properties": {
                    "score": { "type": "integer", "minimum": 0, "maximum": 100 },
                    "level": { "type": "string", "enum": ["High", "Good", "Moderate", "Low", "Unknown"] },
                    "average_recovery_hours": { "type": "number" },
                    "trend": { "type": "string", "enum": ["up", "down", "neutral"] },
                    "trend_percent": { "type": "number" },
                    "total_challenges": { "type": "integer" },
                    "successful_recoveries": { "type": "integer" },
                    "recovery_periods": { "type": "array", "items": { "type": "object" } },
                    "breakdown": { "type": "object" }
                }
            }
        }
    }).to_string()
}
