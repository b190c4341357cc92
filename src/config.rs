//! Scoring configuration
//!
//! All tunable constants of the pipeline live here. The defaults reproduce the
//! dashboard card: a 7-day lookahead, a 40-point baseline and the
//! 30/25/25/20 factor weights.

use crate::error::ResilienceError;
use crate::pairing::DEFAULT_WINDOW_DAYS;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// How to read the `confidence` field of incoming records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceScale {
    /// Values in [0, 1] are fractions, anything larger is a percentage.
    ///
    /// Exactly 1 reads as a full-certainty fraction (100), not as 1%.
    #[default]
    Auto,
    /// Values are already percentages (0-100)
    Percent,
    /// Values are fractions (0-1)
    Unit,
}

impl ConfidenceScale {
    /// Convert a raw confidence value into a 0-100 percentage
    pub fn normalize(&self, raw: f64) -> Option<f64> {
        if !raw.is_finite() {
            return None;
        }
        let pct = match self {
            ConfidenceScale::Percent => raw,
            ConfidenceScale::Unit => raw * 100.0,
            ConfidenceScale::Auto => {
                if (0.0..=1.0).contains(&raw) {
                    raw * 100.0
                } else {
                    raw
                }
            }
        };
        Some(pct.clamp(0.0, 100.0))
    }
}

/// Factor weights for the composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub success_rate: f64,
    pub severity_handling: f64,
    pub recovery_quality: f64,
    pub trend_consistency: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            success_rate: 0.30,
            severity_handling: 0.25,
            recovery_quality: 0.25,
            trend_consistency: 0.20,
        }
    }
}

impl FactorWeights {
    fn sum(&self) -> f64 {
        self.success_rate + self.severity_handling + self.recovery_quality + self.trend_consistency
    }

    fn any_negative(&self) -> bool {
        [
            self.success_rate,
            self.severity_handling,
            self.recovery_quality,
            self.trend_consistency,
        ]
        .iter()
        .any(|w| *w < 0.0 || !w.is_finite())
    }
}

/// Score thresholds for each level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelThresholds {
    pub high: f64,
    pub good: f64,
    pub moderate: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            high: 75.0,
            good: 55.0,
            moderate: 35.0,
        }
    }
}

/// Tunables for classification, pairing and scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Lookahead window for pairing a recovery with a challenge (days)
    pub window_days: i64,
    /// Number of most recent periods kept in the result
    pub display_periods: usize,
    /// Inputs with fewer records score as Unknown
    pub min_records: usize,
    /// Confidence at or above which a record counts as recovery; `None` disables
    pub recovery_confidence_threshold: Option<f64>,
    pub confidence_scale: ConfidenceScale,
    /// Score before any factor is applied
    pub baseline: f64,
    pub weights: FactorWeights,
    /// Trend percentage beyond which the trend is up (or, negated, down)
    pub trend_threshold_pct: f64,
    pub levels: LevelThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            display_periods: 5,
            min_records: 2,
            recovery_confidence_threshold: Some(75.0),
            confidence_scale: ConfidenceScale::Auto,
            baseline: 40.0,
            weights: FactorWeights::default(),
            trend_threshold_pct: 20.0,
            levels: LevelThresholds::default(),
        }
    }
}

impl ScoringConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ResilienceError> {
        let config: ScoringConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ResilienceError> {
        serde_json::to_string_pretty(self).map_err(|e| ResilienceError::EncodingError(e.to_string()))
    }

    /// Check that the configuration describes a usable scorer
    pub fn validate(&self) -> Result<(), ResilienceError> {
        if self.window_days <= 0 {
            return Err(ResilienceError::InvalidConfig(format!(
                "window_days must be positive, got {}",
                self.window_days
            )));
        }
        if Duration::try_days(self.window_days).is_none() {
            return Err(ResilienceError::InvalidConfig(format!(
                "window_days is out of range, got {}",
                self.window_days
            )));
        }
        if self.weights.any_negative() {
            return Err(ResilienceError::InvalidConfig(
                "factor weights must be finite and non-negative".to_string(),
            ));
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ResilienceError::InvalidConfig(format!(
                "factor weights must sum to 1.0, got {:.4}",
                sum
            )));
        }
        let levels = &self.levels;
        if !(levels.high >= levels.good && levels.good >= levels.moderate) {
            return Err(ResilienceError::InvalidConfig(
                "level thresholds must satisfy high >= good >= moderate".to_string(),
            ));
        }
        if self.trend_threshold_pct < 0.0 {
            return Err(ResilienceError::InvalidConfig(
                "trend_threshold_pct must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ScoringConfig::from_json(r#"{"window_days": 3}"#).unwrap();
        assert_eq!(config.window_days, 3);
        assert_eq!(config.display_periods, 5);
        assert_eq!(config.weights, FactorWeights::default());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = ScoringConfig {
            recovery_confidence_threshold: None,
            confidence_scale: ConfidenceScale::Unit,
            ..ScoringConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(ScoringConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let result = ScoringConfig::from_json(r#"{"weights": {"success_rate": 0.5}}"#);
        assert!(matches!(result, Err(ResilienceError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_positive_window() {
        let result = ScoringConfig::from_json(r#"{"window_days": 0}"#);
        assert!(matches!(result, Err(ResilienceError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_out_of_range_window() {
        let result = ScoringConfig::from_json(r#"{"window_days": 200000000000000}"#);
        assert!(matches!(result, Err(ResilienceError::InvalidConfig(msg)) if msg.contains("window_days")));
    }

    #[test]
    fn test_rejects_unordered_levels() {
        let result = ScoringConfig::from_json(r#"{"levels": {"high": 50, "good": 60, "moderate": 35}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_confidence_scale_normalization() {
        assert_eq!(ConfidenceScale::Auto.normalize(0.5), Some(50.0));
        assert_eq!(ConfidenceScale::Auto.normalize(80.0), Some(80.0));
        assert_eq!(ConfidenceScale::Auto.normalize(1.0), Some(100.0));
        assert_eq!(ConfidenceScale::Auto.normalize(1.5), Some(1.5));
        assert_eq!(ConfidenceScale::Percent.normalize(1.0), Some(1.0));
        assert_eq!(ConfidenceScale::Percent.normalize(0.5), Some(0.5));
        assert_eq!(ConfidenceScale::Unit.normalize(0.75), Some(75.0));
        assert_eq!(ConfidenceScale::Percent.normalize(140.0), Some(100.0));
        assert_eq!(ConfidenceScale::Auto.normalize(f64::NAN), None);
    }
}
