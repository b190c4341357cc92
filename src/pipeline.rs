//! Pipeline orchestration
//!
//! This module provides the public API for Resilience Flux.
//! It orchestrates the full pipeline from raw record JSON to a resilience report.

use crate::config::ScoringConfig;
use crate::encoder::ReportEncoder;
use crate::error::ResilienceError;
use crate::pairing::PairingEngine;
use crate::schema::{RawRecord, RecordAdapter};
use crate::scorer::ResilienceScorer;
use crate::types::{ClassifiedRecord, Record, ResilienceReport, ResilienceResult};
use tracing::debug;

/// Compute the resilience result for a record list with default settings.
///
/// Records need not be sorted. The call is pure: the same input always yields
/// the same result.
///
/// # Example
/// ```ignore
/// let result = compute_resilience(&records);
/// println!("{} ({})", result.score, result.level.as_str());
/// ```
pub fn compute_resilience(records: &[Record]) -> ResilienceResult {
    ResilienceProcessor::new().compute(records)
}

/// Classify records with default settings, in chronological order
pub fn classify_records(records: &[Record]) -> Vec<ClassifiedRecord> {
    ResilienceProcessor::new().classify(records)
}

/// Convert raw record JSON (array or NDJSON) to a resilience report JSON.
///
/// # Arguments
/// * `records_json` - Records as a JSON array or newline-delimited JSON
///
/// # Returns
/// Resilience report JSON payload
///
/// # Example
/// ```ignore
/// let report_json = records_to_resilience(journal_json)?;
/// ```
pub fn records_to_resilience(records_json: String) -> Result<String, ResilienceError> {
    ResilienceProcessor::new().process_json(&records_json)
}

/// Configured processor for repeated scoring.
///
/// Holds no per-call state; every call recomputes from its input.
pub struct ResilienceProcessor {
    config: ScoringConfig,
    engine: PairingEngine,
    scorer: ResilienceScorer,
    encoder: ReportEncoder,
}

impl Default for ResilienceProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResilienceProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::build(ScoringConfig::default())
    }

    /// Create a processor with a validated configuration
    pub fn with_config(config: ScoringConfig) -> Result<Self, ResilienceError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Create a processor from configuration JSON
    pub fn from_config_json(json: &str) -> Result<Self, ResilienceError> {
        Self::with_config(ScoringConfig::from_json(json)?)
    }

    fn build(config: ScoringConfig) -> Self {
        Self {
            engine: PairingEngine::from_config(&config),
            scorer: ResilienceScorer::new(config.clone()),
            encoder: ReportEncoder::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Classify records in chronological order
    pub fn classify(&self, records: &[Record]) -> Vec<ClassifiedRecord> {
        self.engine.classify_sorted(records)
    }

    /// Run classification, pairing and scoring
    pub fn compute(&self, records: &[Record]) -> ResilienceResult {
        let classified = self.engine.classify_sorted(records);
        self.compute_classified(&classified)
    }

    fn compute_classified(&self, classified: &[ClassifiedRecord]) -> ResilienceResult {
        // Stage 1: Pair challenges with recoveries
        let periods = self.engine.pair_classified(classified);

        // Stage 2: Score
        let result = self.scorer.score(classified.len(), &periods);

        debug!(
            records = classified.len(),
            challenges = result.total_challenges,
            recoveries = result.successful_recoveries,
            score = result.score,
            resilience_level = result.level.as_str(),
            "computed resilience"
        );
        result
    }

    /// Build a full report for already converted records
    pub fn report(&self, records: &[Record], skipped_records: usize) -> ResilienceReport {
        let classified = self.engine.classify_sorted(records);
        let result = self.compute_classified(&classified);
        self.encoder.encode(&classified, &result, skipped_records)
    }

    /// Convert raw records leniently and build a report
    pub fn process_raw(&self, raw: &[RawRecord]) -> ResilienceReport {
        let conversion = RecordAdapter::to_records(raw, self.config.confidence_scale);
        self.report(&conversion.records, conversion.skipped.len())
    }

    /// Parse raw record JSON (array or NDJSON) and return report JSON
    pub fn process_json(&self, input: &str) -> Result<String, ResilienceError> {
        // Stage 0: Parse input
        let raw = RecordAdapter::parse_any(input)?;

        let report = self.process_raw(&raw);
        serde_json::to_string(&report).map_err(|e| ResilienceError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResilienceLevel, Trend};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    fn at(id: &str, hours: i64, content: &str) -> Record {
        Record::new(id, start() + Duration::hours(hours), content)
    }

    fn sample_records_json() -> &'static str {
        r#"[
            {"id": 1, "created_at": "2024-06-03T09:00:00Z", "content": "Major setback, the loan was denied", "mood": "stressed"},
            {"id": 2, "created_at": "2024-06-03T19:00:00Z", "content": "Found a solution with a local credit union", "sentiment": {"primary_mood": "confident", "confidence": 0.92}},
            {"id": 3, "created_at": "2024-06-10T09:00:00Z", "content": "Shipping delays, real problem", "mood": "frustrated"},
            {"id": 4, "created_at": "2024-06-11T09:00:00Z", "content": "Made progress with a new carrier", "mood": "hopeful"},
            {"id": 5, "created_at": "not a date", "content": "corrupt row"}
        ]"#
    }

    #[test]
    fn test_single_record_is_unknown() {
        let result = compute_resilience(&[at("c1", 0, "Another setback").with_mood("stressed")]);

        assert_eq!(result.score, 0);
        assert_eq!(result.level, ResilienceLevel::Unknown);
        assert!(result.recovery_periods.is_empty());
    }

    #[test]
    fn test_empty_input_is_unknown() {
        assert_eq!(compute_resilience(&[]), ResilienceResult::unknown());
    }

    #[test]
    fn test_setback_then_solution() {
        let records = vec![
            at("c1", 0, "major setback").with_mood("stressed"),
            at("r1", 10, "found a solution").with_mood("confident"),
        ];

        let result = compute_resilience(&records);

        assert_eq!(result.recovery_periods.len(), 1);
        let period = &result.recovery_periods[0];
        assert!(period.recovery.is_some());
        assert!((period.elapsed_hours.unwrap() - 10.0).abs() < 1e-9);
        assert!(result.score > 40);
        assert_eq!(result.average_recovery_hours, 10.0);
    }

    #[test]
    fn test_two_challenges_without_recovery() {
        let records = vec![
            at("c1", 0, "Payment failed again").with_mood("worried"),
            at("n1", 12, "Reviewed invoices"),
            at("c2", 48, "Supplier difficult to reach").with_mood("frustrated"),
            at("n2", 60, "Updated the website copy"),
        ];

        let result = compute_resilience(&records);

        assert_eq!(result.total_challenges, 2);
        assert_eq!(result.successful_recoveries, 0);
        assert_eq!(result.score, 25);
        assert_eq!(result.level, ResilienceLevel::Low);
    }

    #[test]
    fn test_late_recovery_is_not_paired() {
        let records = vec![
            at("c1", 0, "Another setback").with_mood("stressed"),
            at("r1", 24 * 8, "Huge breakthrough").with_mood("confident"),
        ];

        let result = compute_resilience(&records);

        assert_eq!(result.recovery_periods.len(), 1);
        assert!(result.recovery_periods[0].recovery.is_none());
        assert!(result.recovery_periods[0].elapsed_hours.is_none());
    }

    #[test]
    fn test_compute_is_idempotent() {
        let records = vec![
            at("r2", 30, "Feeling better").with_mood("calm"),
            at("c1", 0, "Another setback").with_mood("stressed"),
            at("r1", 6, "Progress on the plan").with_mood("hopeful"),
            at("c2", 24, "Cash crisis").with_mood("exhausted"),
        ];

        let first = compute_resilience(&records);
        let second = compute_resilience(&records);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_steady_fast_recoveries_score_high() {
        let mut records = Vec::new();
        for week in 0..5 {
            let base = week * 24 * 7;
            records.push(at(&format!("c{week}"), base, "Another setback").with_mood("stressed"));
            records.push(at(&format!("r{week}"), base + 4, "Solved it").with_mood("confident"));
        }

        let result = compute_resilience(&records);

        assert_eq!(result.successful_recoveries, 5);
        assert_eq!(result.trend, Trend::Neutral);
        assert_eq!(result.breakdown.consistency_bonus, Some(20.0));
        assert_eq!(result.level, ResilienceLevel::High);
    }

    #[test]
    fn test_records_to_resilience() {
        let json = records_to_resilience(sample_records_json().to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["report_version"], "1.0.0");
        assert_eq!(payload["producer"]["name"], "resilience-flux");
        assert_eq!(payload["provenance"]["record_count"], 4);
        assert_eq!(payload["quality"]["skipped_records"], 1);
        assert_eq!(payload["result"]["total_challenges"], 2);
        assert_eq!(payload["result"]["successful_recoveries"], 2);
        assert_eq!(payload["result"]["average_recovery_hours"], 17.0);

        let flags = payload["quality"]["flags"].as_array().unwrap();
        assert!(flags.iter().any(|f| f == "skipped_records"));
    }

    #[test]
    fn test_negative_confidence_does_not_drop_challenge() {
        let json = r#"[
            {"id": "c", "created_at": "2024-06-03T09:00:00Z", "content": "major setback", "mood": "stressed", "sentiment": {"confidence": -1}},
            {"id": "n1", "created_at": "2024-06-04T09:00:00Z", "content": "Reviewed invoices"},
            {"id": "n2", "created_at": "2024-06-05T09:00:00Z", "content": "Updated the website copy"}
        ]"#;

        let report = records_to_resilience(json.to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(payload["quality"]["skipped_records"], 0);
        assert_eq!(payload["result"]["total_challenges"], 1);
        assert_eq!(payload["result"]["score"], 25);
        assert_eq!(payload["result"]["level"], "Low");
    }

    #[test]
    fn test_mistyped_field_still_scores_batch() {
        let json = r#"[
            {"id": "c", "created_at": "2024-06-03T09:00:00Z", "content": "Another setback", "mood": 5, "sentiment": {"primary_mood": "stressed", "confidence": "high"}},
            {"id": "r", "created_at": "2024-06-03T15:00:00Z", "content": "Solved it", "mood": "confident"}
        ]"#;

        let report = records_to_resilience(json.to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(payload["provenance"]["record_count"], 2);
        assert_eq!(payload["result"]["total_challenges"], 1);
        assert_eq!(payload["result"]["successful_recoveries"], 1);
        assert_eq!(payload["result"]["average_recovery_hours"], 6.0);
    }

    #[test]
    fn test_invalid_json() {
        let result = records_to_resilience("not valid json".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_processor_with_config() {
        let processor = ResilienceProcessor::from_config_json(r#"{"window_days": 1}"#).unwrap();
        let records = vec![
            at("c1", 0, "Another setback").with_mood("stressed"),
            at("r1", 30, "Solved it").with_mood("confident"),
        ];

        let result = processor.compute(&records);

        assert_eq!(result.successful_recoveries, 0);
        assert_eq!(processor.config().window_days, 1);
    }

    #[test]
    fn test_processor_rejects_invalid_config() {
        let result = ResilienceProcessor::from_config_json(r#"{"window_days": -2}"#);
        assert!(matches!(result, Err(ResilienceError::InvalidConfig(_))));
    }

    #[test]
    fn test_classify_orders_chronologically() {
        let records = vec![
            at("later", 5, "Solved it"),
            at("earlier", 0, "Another setback"),
        ];

        let classified = classify_records(&records);

        assert_eq!(classified[0].record.id, "earlier");
        assert!(classified[0].is_challenge);
        assert!(classified[1].is_recovery);
    }
}
