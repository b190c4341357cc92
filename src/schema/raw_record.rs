//! journal.record.v1 schema definition
//!
//! Records arrive from the hosted store in more than one shape: older rows
//! carry top-level `mood`/`category`, newer rows carry a `sentiment` object
//! with `primary_mood`, `business_category` and `confidence`. Every field
//! except `created_at` is optional, and an optional field of the wrong JSON
//! type reads as absent instead of failing the batch.

use crate::config::ConfidenceScale;
use crate::types::Record;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Current schema version
pub const SCHEMA_VERSION: &str = "journal.record.v1";

/// Sentiment analysis attached to newer records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub primary_mood: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub business_category: Option<String>,
    /// Confidence of the analysis; 0-1 or 0-100 depending on the producer
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A record exactly as read from the input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Opaque identifier; strings and numbers are both accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    /// Creation timestamp (RFC 3339, or naive ISO 8601 read as UTC)
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Legacy mood label
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    /// Legacy category label
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_sentiment", skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

/// Strings pass through; any other JSON type reads as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Numbers and numeric strings pass through; anything else reads as absent
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

/// A sentiment that is not an object reads as absent
fn lenient_sentiment<'de, D>(deserializer: D) -> Result<Option<Sentiment>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(value @ serde_json::Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

impl RawRecord {
    /// Create a record with only a timestamp and content
    pub fn new(created_at: DateTime<Utc>, content: impl Into<String>) -> Self {
        RawRecord {
            id: Some(serde_json::Value::String(uuid::Uuid::new_v4().to_string())),
            created_at: Some(created_at.to_rfc3339()),
            content: Some(content.into()),
            ..RawRecord::default()
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

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// Identifier as a string, if one was supplied
    pub fn id_string(&self) -> Option<String> {
        match &self.id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Parse the creation timestamp
    pub fn timestamp(&self) -> Result<DateTime<Utc>, ValidationError> {
        let raw = self
            .created_at
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::MissingTimestamp)?;
        parse_timestamp(raw).ok_or_else(|| ValidationError::InvalidTimestamp(raw.to_string()))
    }

    /// Mood label; the sentiment field wins over the legacy one
    pub fn resolved_mood(&self) -> Option<&str> {
        let from_sentiment = self.sentiment.as_ref().and_then(|s| s.primary_mood.as_deref());
        non_blank(from_sentiment).or_else(|| non_blank(self.mood.as_deref()))
    }

    /// Category label; the sentiment field wins over the legacy one
    pub fn resolved_category(&self) -> Option<&str> {
        let from_sentiment = self
            .sentiment
            .as_ref()
            .and_then(|s| s.business_category.as_deref());
        non_blank(from_sentiment).or_else(|| non_blank(self.category.as_deref()))
    }

    pub fn raw_confidence(&self) -> Option<f64> {
        self.sentiment.as_ref().and_then(|s| s.confidence)
    }

    /// Confidence that can be scored; negative or non-finite values are dropped
    pub fn usable_confidence(&self) -> Option<f64> {
        self.raw_confidence().filter(|c| c.is_finite() && *c >= 0.0)
    }

    /// Validate the record
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.timestamp()?;
        if let Some(conf) = self.raw_confidence() {
            if conf < 0.0 {
                return Err(ValidationError::NegativeConfidence(conf));
            }
        }
        Ok(())
    }

    /// Convert into a pipeline [`Record`].
    ///
    /// `index` is used to synthesize an identifier when none was supplied.
    /// Only the timestamp is required; an unusable confidence is dropped and
    /// the rest of the record is kept.
    pub fn to_record(&self, index: usize, scale: ConfidenceScale) -> Result<Record, ValidationError> {
        let created_at = self.timestamp()?;

        Ok(Record {
            id: self.id_string().unwrap_or_else(|| format!("record-{}", index)),
            created_at,
            content: self.content.clone().unwrap_or_default(),
            mood: self.resolved_mood().map(str::to_string),
            category: self.resolved_category().map(str::to_string),
            confidence: self.usable_confidence().and_then(|c| scale.normalize(c)),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Postgres-style "2024-01-15 08:00:00+00"
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing created_at timestamp")]
    MissingTimestamp,
    #[error("Unparseable created_at timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Negative sentiment confidence: {0}")]
    NegativeConfidence(f64),
}
