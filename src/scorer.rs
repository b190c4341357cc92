//! Resilience scoring
//!
//! Reduces recovery periods to a 0-100 score and a discrete level.
//!
//! ```text
//! score = baseline
//!       + 0.30 * (success_rate      - 50)
//!       + 0.25 * (severity_handling - 50)
//!       + 0.25 * (recovery_quality  - 50)
//!       + 0.20 * (trend_consistency - 50)
//! ```
//!
//! Every factor sits on a 0-100 scale and falls back to a neutral 50 when
//! there is nothing to measure, so the function is total.

use crate::config::ScoringConfig;
use crate::types::{RecoveryPeriod, ResilienceLevel, ResilienceResult, ScoreBreakdown, Trend};

/// Neutral value of every factor
const NEUTRAL: f64 = 50.0;

/// Hours per point lost on the speed score (72 hours costs 100 points)
const HOURS_PER_SPEED_POINT: f64 = 0.72;

/// Floor for the speed part of recovery quality
const MIN_SPEED_SCORE: f64 = 20.0;

/// Successful recoveries needed before a trend is computed
const MIN_RECOVERIES_FOR_TREND: usize = 4;

/// Successful recoveries needed before the consistency bonus applies
const MIN_RECOVERIES_FOR_CONSISTENCY: usize = 3;

/// Largest consistency bonus, reached when every recovery takes equally long
const MAX_CONSISTENCY_BONUS: f64 = 20.0;

/// Scorer for recovery periods
#[derive(Debug, Clone, Default)]
pub struct ResilienceScorer {
    config: ScoringConfig,
}

impl ResilienceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score the periods derived from `record_count` records
    pub fn score(&self, record_count: usize, periods: &[RecoveryPeriod]) -> ResilienceResult {
        if record_count < self.config.min_records || periods.is_empty() {
            return ResilienceResult::unknown();
        }

        let recovery_hours: Vec<f64> = periods.iter().filter_map(|p| p.elapsed_hours).collect();
        let successful = recovery_hours.len();

        let average_recovery_hours = mean(&recovery_hours).unwrap_or(0.0);
        let (trend_percent, trend) = self.compute_trend(&recovery_hours);

        let success_rate = successful as f64 / periods.len() as f64 * 100.0;
        let severity_handling = compute_severity_handling(periods);
        let recovery_quality = compute_recovery_quality(periods);
        let consistency_bonus = compute_consistency_bonus(&recovery_hours);
        let trend_consistency =
            (NEUTRAL + trend_percent * 0.5 + consistency_bonus.unwrap_or(0.0)).clamp(0.0, 100.0);

        let weights = &self.config.weights;
        let raw = self.config.baseline
            + weights.success_rate * (success_rate - NEUTRAL)
            + weights.severity_handling * (severity_handling - NEUTRAL)
            + weights.recovery_quality * (recovery_quality - NEUTRAL)
            + weights.trend_consistency * (trend_consistency - NEUTRAL);
        let score = raw.clamp(0.0, 100.0).round() as u8;

        let keep = self.config.display_periods.min(periods.len());
        let recovery_periods = periods[periods.len() - keep..].to_vec();

        ResilienceResult {
            score,
            level: self.level_for(score),
            average_recovery_hours,
            trend,
            trend_percent,
            total_challenges: periods.len(),
            successful_recoveries: successful,
            recovery_periods,
            breakdown: ScoreBreakdown {
                success_rate,
                severity_handling,
                recovery_quality,
                trend_consistency,
                consistency_bonus,
            },
        }
    }

    /// Map a score onto a level
    pub fn level_for(&self, score: u8) -> ResilienceLevel {
        let score = f64::from(score);
        let levels = &self.config.levels;
        if score >= levels.high {
            ResilienceLevel::High
        } else if score >= levels.good {
            ResilienceLevel::Good
        } else if score >= levels.moderate {
            ResilienceLevel::Moderate
        } else {
            ResilienceLevel::Low
        }
    }

    /// Compare the two most recent recoveries against the two before them.
    ///
    /// Positive percentages mean recent recoveries were faster.
    fn compute_trend(&self, recovery_hours: &[f64]) -> (f64, Trend) {
        let n = recovery_hours.len();
        if n < MIN_RECOVERIES_FOR_TREND {
            return (0.0, Trend::Neutral);
        }

        let recent = (recovery_hours[n - 1] + recovery_hours[n - 2]) / 2.0;
        let older = (recovery_hours[n - 3] + recovery_hours[n - 4]) / 2.0;
        if older <= 0.0 {
            return (0.0, Trend::Neutral);
        }

        let percent = (older - recent) / older * 100.0;
        let threshold = self.config.trend_threshold_pct;
        let trend = if percent > threshold {
            Trend::Up
        } else if percent < -threshold {
            Trend::Down
        } else {
            Trend::Neutral
        };

        (percent, trend)
    }
}

/// Mean of `100 - difficulty` over recovered challenges
fn compute_severity_handling(periods: &[RecoveryPeriod]) -> f64 {
    let handled: Vec<f64> = periods
        .iter()
        .filter(|p| p.is_recovered())
        .map(|p| 100.0 - p.challenge_severity.difficulty())
        .collect();
    mean(&handled).unwrap_or(NEUTRAL)
}

/// Mean per-recovery quality: speed score plus strength bonus, capped at 100
fn compute_recovery_quality(periods: &[RecoveryPeriod]) -> f64 {
    let qualities: Vec<f64> = periods
        .iter()
        .filter_map(|p| {
            p.elapsed_hours.map(|hours| {
                let bonus = p.recovery_strength.map_or(0.0, |s| s.quality_bonus());
                (speed_score(hours) + bonus).min(100.0)
            })
        })
        .collect();
    mean(&qualities).unwrap_or(NEUTRAL)
}

/// Speed score for one recovery: 100 at zero hours, floored at 20
fn speed_score(hours: f64) -> f64 {
    (100.0 - hours / HOURS_PER_SPEED_POINT).max(MIN_SPEED_SCORE)
}

/// Bonus for steady recovery times: `20 / (1 + cv)` where cv is the
/// coefficient of variation of the recovery hours
fn compute_consistency_bonus(recovery_hours: &[f64]) -> Option<f64> {
    if recovery_hours.len() < MIN_RECOVERIES_FOR_CONSISTENCY {
        return None;
    }

    let avg = mean(recovery_hours)?;
    if avg <= 0.0 {
        return Some(MAX_CONSISTENCY_BONUS);
    }

    let variance = recovery_hours.iter().map(|h| (h - avg).powi(2)).sum::<f64>()
        / recovery_hours.len() as f64;
    let cv = variance.sqrt() / avg;
    Some(MAX_CONSISTENCY_BONUS / (1.0 + cv))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
