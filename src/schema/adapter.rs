//! Adapter for converting journal.record.v1 input into pipeline records
//!
//! Parsing is strict about JSON syntax and lenient about content: records
//! whose timestamp cannot be read are skipped (and reported) rather than
//! failing the whole batch.

use crate::config::ConfidenceScale;
use crate::error::ResilienceError;
use crate::schema::raw_record::*;
use crate::types::Record;
use tracing::{debug, warn};

/// Adapter for converting raw records to pipeline records
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON string containing an array of RawRecords
    pub fn parse_array(json: &str) -> Result<Vec<RawRecord>, ResilienceError> {
        let records: Vec<RawRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing RawRecords
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawRecord>, ResilienceError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ResilienceError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Parse either a JSON array or NDJSON, judged by the first non-blank character
    pub fn parse_any(input: &str) -> Result<Vec<RawRecord>, ResilienceError> {
        if input.trim_start().starts_with('[') {
            Self::parse_array(input)
        } else {
            Self::parse_ndjson(input)
        }
    }

    /// Convert raw records, skipping the ones that fail validation
    pub fn to_records(raw: &[RawRecord], scale: ConfidenceScale) -> Conversion {
        let mut records = Vec::with_capacity(raw.len());
        let mut skipped = Vec::new();

        for (index, record) in raw.iter().enumerate() {
            match record.to_record(index, scale) {
                Ok(converted) => {
                    if let Some(confidence) = record
                        .raw_confidence()
                        .filter(|_| record.usable_confidence().is_none())
                    {
                        warn!(index, confidence, "ignoring unusable confidence");
                    }
                    records.push(converted);
                }
                Err(error) => {
                    warn!(index, %error, "skipping record");
                    skipped.push(ValidationResult {
                        index,
                        record_id: record.id_string(),
                        error,
                    });
                }
            }
        }

        if scale == ConfidenceScale::Auto && has_mixed_confidence_scales(raw) {
            warn!("records mix 0-1 and 0-100 confidence values; each value is scaled on its own");
        }

        debug!(converted = records.len(), skipped = skipped.len(), "converted records");
        Conversion { records, skipped }
    }

    /// Convert raw records, failing on the first invalid one
    pub fn to_records_strict(
        raw: &[RawRecord],
        scale: ConfidenceScale,
    ) -> Result<Vec<Record>, ResilienceError> {
        raw.iter()
            .enumerate()
            .map(|(index, record)| {
                record.to_record(index, scale).map_err(|e| match e {
                    ValidationError::MissingTimestamp => {
                        ResilienceError::MissingField(format!("created_at (record {})", index))
                    }
                    ValidationError::InvalidTimestamp(raw) => ResilienceError::InvalidTimestamp(
                        format!("record {}: {}", index, raw),
                    ),
                    other => ResilienceError::ParseError(format!(
                        "Invalid record at index {}: {}",
                        index, other
                    )),
                })
            })
            .collect()
    }

    /// Validate a batch of records
    pub fn validate_records(raw: &[RawRecord]) -> Vec<ValidationResult> {
        raw.iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.validate().err().map(|error| ValidationResult {
                    index,
                    record_id: record.id_string(),
                    error,
                })
            })
            .collect()
    }
}

/// Outcome of a lenient conversion
#[derive(Debug, Default)]
pub struct Conversion {
    pub records: Vec<Record>,
    pub skipped: Vec<ValidationResult>,
}

/// A record that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub index: usize,
    pub record_id: Option<String>,
    pub error: ValidationError,
}

fn has_mixed_confidence_scales(raw: &[RawRecord]) -> bool {
    let values: Vec<f64> = raw.iter().filter_map(RawRecord::raw_confidence).collect();
    let fractional = values.iter().any(|v| *v > 0.0 && *v < 1.0);
    let percent = values.iter().any(|v| *v > 1.0);
    fractional && percent
}
