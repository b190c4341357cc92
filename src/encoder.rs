//! Report encoding
//!
//! This module wraps a resilience result into a versioned report payload with
//! producer metadata, provenance, data quality and a classification summary.

use crate::config::ScoringConfig;
use crate::error::ResilienceError;
use crate::types::{
    ChallengeSeverity, ClassificationSummary, ClassifiedRecord, QualityFlag, RecoveryStrength,
    ReportProducer, ReportProvenance, ReportQuality, ResilienceReport, ResilienceResult,
};
use crate::{PRODUCER_NAME, RESILIENCE_VERSION};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Coverage below which the report flags missing mood signals
const MIN_SIGNAL_COVERAGE: f64 = 0.5;

/// Successful recoveries needed for a trend
const TREND_MIN_RECOVERIES: usize = 4;

/// Report encoder
pub struct ReportEncoder {
    instance_id: String,
    min_records: usize,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self::from_config(&ScoringConfig::default())
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            min_records: config.min_records,
        }
    }

    /// Use a fixed instance ID
    pub fn with_instance_id(mut self, instance_id: String) -> Self {
        self.instance_id = instance_id;
        self
    }

    /// Encode a result and the classified records it came from
    pub fn encode(
        &self,
        classified: &[ClassifiedRecord],
        result: &ResilienceResult,
        skipped_records: usize,
    ) -> ResilienceReport {
        self.encode_at(classified, result, skipped_records, Utc::now())
    }

    fn encode_at(
        &self,
        classified: &[ClassifiedRecord],
        result: &ResilienceResult,
        skipped_records: usize,
        computed_at: DateTime<Utc>,
    ) -> ResilienceReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: RESILIENCE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let first = classified.iter().map(|c| c.record.created_at).min();
        let last = classified.iter().map(|c| c.record.created_at).max();
        let provenance = ReportProvenance {
            record_count: classified.len(),
            first_record_at_utc: first.map(|t| t.to_rfc3339()),
            last_record_at_utc: last.map(|t| t.to_rfc3339()),
            computed_at_utc: computed_at.to_rfc3339(),
        };

        let summary = summarize(classified);
        let quality = self.build_quality(classified, &summary, result, skipped_records);

        ResilienceReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            quality,
            summary,
            result: result.clone(),
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        classified: &[ClassifiedRecord],
        result: &ResilienceResult,
        skipped_records: usize,
    ) -> Result<String, ResilienceError> {
        let report = self.encode(classified, result, skipped_records);
        serde_json::to_string(&report).map_err(|e| ResilienceError::EncodingError(e.to_string()))
    }

    fn build_quality(
        &self,
        classified: &[ClassifiedRecord],
        summary: &ClassificationSummary,
        result: &ResilienceResult,
        skipped_records: usize,
    ) -> ReportQuality {
        let coverage = signal_coverage(classified);
        let mut flags = Vec::new();

        if classified.len() < self.min_records {
            flags.push(QualityFlag::InsufficientRecords);
        } else if summary.challenges == 0 {
            flags.push(QualityFlag::NoChallenges);
        }

        if result.total_challenges > 0 {
            if result.successful_recoveries == 0 {
                flags.push(QualityFlag::NoRecoveries);
            }
            if result.successful_recoveries < TREND_MIN_RECOVERIES {
                flags.push(QualityFlag::TrendUnavailable);
            }
        }

        if skipped_records > 0 {
            flags.push(QualityFlag::SkippedRecords);
        }

        if !classified.is_empty() && coverage < MIN_SIGNAL_COVERAGE {
            flags.push(QualityFlag::MissingMoodSignals);
        }

        ReportQuality {
            coverage,
            skipped_records,
            flags: flags.iter().map(|f| f.as_str().to_string()).collect(),
        }
    }
}

/// Share of records carrying a mood or category label
fn signal_coverage(classified: &[ClassifiedRecord]) -> f64 {
    if classified.is_empty() {
        return 0.0;
    }
    let labelled = classified
        .iter()
        .filter(|c| c.record.mood.is_some() || c.record.category.is_some())
        .count();
    labelled as f64 / classified.len() as f64
}

fn summarize(classified: &[ClassifiedRecord]) -> ClassificationSummary {
    let mut summary = ClassificationSummary::default();

    for entry in classified {
        match entry.challenge_severity {
            Some(ChallengeSeverity::Severe) => summary.severe += 1,
            Some(ChallengeSeverity::Moderate) => summary.moderate_challenges += 1,
            Some(ChallengeSeverity::Mild) => summary.mild_challenges += 1,
            None => {}
        }
        match entry.recovery_strength {
            Some(RecoveryStrength::Strong) => summary.strong += 1,
            Some(RecoveryStrength::Moderate) => summary.moderate_recoveries += 1,
            Some(RecoveryStrength::Mild) => summary.mild_recoveries += 1,
            None => {}
        }

        if entry.is_challenge {
            summary.challenges += 1;
        }
        if entry.is_recovery {
            summary.recoveries += 1;
        }
        if !entry.is_challenge && !entry.is_recovery {
            summary.neutral += 1;
        }
    }

    summary
}
