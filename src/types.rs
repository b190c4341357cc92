//! Core types for the Resilience Flux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: records, classified records, recovery periods, the scored result
//! and the encoded report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A journal entry as consumed by the pipeline.
///
/// Records are owned by the external store and treated as read-only. The
/// `mood` and `category` fields are already resolved from whichever source
/// field the raw record carried (see [`crate::schema::RawRecord`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque identifier from the external store
    pub id: String,
    /// Creation time (UTC), used for ordering and elapsed time
    pub created_at: DateTime<Utc>,
    /// Free-text body scanned for keyword signals
    pub content: String,
    /// Mood label, if any
    pub mood: Option<String>,
    /// Category label, if any
    pub category: Option<String>,
    /// Sentiment confidence normalized to a 0-100 percentage
    pub confidence: Option<f64>,
}

impl Record {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>, content: impl Into<String>) -> Self {
        Record {
            id: id.into(),
            created_at,
            content: content.into(),
            mood: None,
            category: None,
            confidence: None,
        }
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attach a confidence value already expressed as a percentage
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// How hard a challenge entry reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeSeverity {
    Mild,
    Moderate,
    Severe,
}

impl ChallengeSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeSeverity::Mild => "mild",
            ChallengeSeverity::Moderate => "moderate",
            ChallengeSeverity::Severe => "severe",
        }
    }

    /// Difficulty score; lower means a harder challenge to come back from
    pub fn difficulty(&self) -> f64 {
        match self {
            ChallengeSeverity::Severe => 20.0,
            ChallengeSeverity::Moderate => 35.0,
            ChallengeSeverity::Mild => 50.0,
        }
    }
}

/// How convincing a recovery entry reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStrength {
    Mild,
    Moderate,
    Strong,
}

impl RecoveryStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryStrength::Mild => "mild",
            RecoveryStrength::Moderate => "moderate",
            RecoveryStrength::Strong => "strong",
        }
    }

    /// Bonus added to the per-recovery speed score
    pub fn quality_bonus(&self) -> f64 {
        match self {
            RecoveryStrength::Strong => 20.0,
            RecoveryStrength::Moderate => 10.0,
            RecoveryStrength::Mild => 5.0,
        }
    }
}

/// Display label of a classified entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryLabel {
    Challenge,
    Recovery,
    Neutral,
}

/// A record with its challenge/recovery classification attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub record: Record,
    pub is_challenge: bool,
    pub challenge_severity: Option<ChallengeSeverity>,
    pub is_recovery: bool,
    pub recovery_strength: Option<RecoveryStrength>,
}

impl ClassifiedRecord {
    /// Single label for display; challenge wins over recovery
    pub fn label(&self) -> EntryLabel {
        if self.is_challenge {
            EntryLabel::Challenge
        } else if self.is_recovery {
            EntryLabel::Recovery
        } else {
            EntryLabel::Neutral
        }
    }
}

/// A challenge and the first recovery that followed it inside the window.
///
/// `elapsed_hours` is `Some` exactly when `recovery` is `Some`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryPeriod {
    pub challenge: Record,
    pub challenge_severity: ChallengeSeverity,
    pub recovery: Option<Record>,
    pub recovery_strength: Option<RecoveryStrength>,
    pub elapsed_hours: Option<f64>,
}

impl RecoveryPeriod {
    pub fn is_recovered(&self) -> bool {
        self.recovery.is_some()
    }
}

/// Direction of recent recovery times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

/// Discrete resilience level shown on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResilienceLevel {
    High,
    Good,
    Moderate,
    Low,
    Unknown,
}

impl ResilienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResilienceLevel::High => "High",
            ResilienceLevel::Good => "Good",
            ResilienceLevel::Moderate => "Moderate",
            ResilienceLevel::Low => "Low",
            ResilienceLevel::Unknown => "Unknown",
        }
    }
}

/// Per-factor sub-scores, each on a 0-100 scale centered at 50
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Successful recoveries as a percentage of challenges
    pub success_rate: f64,
    /// Rewards recovering from harder challenges
    pub severity_handling: f64,
    /// Speed of recovery plus strength bonus
    pub recovery_quality: f64,
    /// Trend contribution including any consistency bonus
    pub trend_consistency: f64,
    /// Consistency bonus, present once enough recoveries exist
    pub consistency_bonus: Option<f64>,
}

impl Default for ScoreBreakdown {
    fn default() -> Self {
        Self {
            success_rate: 0.0,
            severity_handling: 0.0,
            recovery_quality: 0.0,
            trend_consistency: 0.0,
            consistency_bonus: None,
        }
    }
}

/// Output of one resilience computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResilienceResult {
    /// Composite score (0-100)
    pub score: u8,
    pub level: ResilienceLevel,
    /// Mean hours from challenge to recovery over successful periods
    pub average_recovery_hours: f64,
    pub trend: Trend,
    /// Signed improvement of recent recoveries over older ones (percent)
    pub trend_percent: f64,
    pub total_challenges: usize,
    pub successful_recoveries: usize,
    /// Most recent periods kept for display
    pub recovery_periods: Vec<RecoveryPeriod>,
    pub breakdown: ScoreBreakdown,
}

impl ResilienceResult {
    /// Result for inputs too small to say anything about
    pub fn unknown() -> Self {
        Self {
            score: 0,
            level: ResilienceLevel::Unknown,
            average_recovery_hours: 0.0,
            trend: Trend::Neutral,
            trend_percent: 0.0,
            total_challenges: 0,
            successful_recoveries: 0,
            recovery_periods: Vec::new(),
            breakdown: ScoreBreakdown::default(),
        }
    }
}

/// Quality flag indicating data issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    InsufficientRecords,
    NoChallenges,
    NoRecoveries,
    TrendUnavailable,
    SkippedRecords,
    MissingMoodSignals,
}

impl QualityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityFlag::InsufficientRecords => "insufficient_records",
            QualityFlag::NoChallenges => "no_challenges",
            QualityFlag::NoRecoveries => "no_recoveries",
            QualityFlag::TrendUnavailable => "trend_unavailable",
            QualityFlag::SkippedRecords => "skipped_records",
            QualityFlag::MissingMoodSignals => "missing_mood_signals",
        }
    }
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Where the scored records came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub record_count: usize,
    pub first_record_at_utc: Option<String>,
    pub last_record_at_utc: Option<String>,
    pub computed_at_utc: String,
}

/// Data quality metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportQuality {
    /// Share of records carrying a mood or category (0-1)
    pub coverage: f64,
    /// Records dropped by the adapter before scoring
    pub skipped_records: usize,
    pub flags: Vec<String>,
}

/// Counts of classified entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    pub challenges: usize,
    pub recoveries: usize,
    pub neutral: usize,
    pub severe: usize,
    pub moderate_challenges: usize,
    pub mild_challenges: usize,
    pub strong: usize,
    pub moderate_recoveries: usize,
    pub mild_recoveries: usize,
}

/// Complete resilience report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub quality: ReportQuality,
    pub summary: ClassificationSummary,
    pub result: ResilienceResult,
}
