//! Challenge/recovery pairing
//!
//! Walks records in time order and pairs each challenge with the first
//! recovery that follows it inside the lookahead window.

use crate::classifier::EntryClassifier;
use crate::config::ScoringConfig;
use crate::types::{ClassifiedRecord, Record, RecoveryPeriod};
use chrono::{DateTime, Duration, Utc};

/// Default lookahead window in days
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Pairing engine for recovery periods
#[derive(Debug, Clone)]
pub struct PairingEngine {
    classifier: EntryClassifier,
    window: Duration,
}

impl Default for PairingEngine {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl PairingEngine {
    pub fn new(classifier: EntryClassifier, window_days: i64) -> Self {
        Self {
            classifier,
            // Out-of-range windows are rejected by `ScoringConfig::validate`
            window: Duration::try_days(window_days).unwrap_or(Duration::MAX),
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(EntryClassifier::from_config(config), config.window_days)
    }

    /// Sort records by creation time and classify them.
    ///
    /// The sort is stable, so records sharing a timestamp keep input order.
    pub fn classify_sorted(&self, records: &[Record]) -> Vec<ClassifiedRecord> {
        let mut classified = self.classifier.classify_all(records);
        classified.sort_by_key(|c| c.record.created_at);
        classified
    }

    /// Produce one recovery period per challenge, in chronological order
    pub fn pair(&self, records: &[Record]) -> Vec<RecoveryPeriod> {
        let classified = self.classify_sorted(records);
        self.pair_classified(&classified)
    }

    /// Pair an already classified, time-ordered sequence
    pub fn pair_classified(&self, classified: &[ClassifiedRecord]) -> Vec<RecoveryPeriod> {
        let mut periods = Vec::new();

        for (i, entry) in classified.iter().enumerate() {
            let Some(severity) = entry.challenge_severity else {
                continue;
            };

            let challenge_at = entry.record.created_at;
            let recovery = classified[i + 1..]
                .iter()
                .take_while(|later| later.record.created_at - challenge_at <= self.window)
                .filter(|later| later.record.created_at > challenge_at)
                .find(|later| later.is_recovery);

            let period = match recovery {
                Some(found) => RecoveryPeriod {
                    challenge: entry.record.clone(),
                    challenge_severity: severity,
                    recovery: Some(found.record.clone()),
                    recovery_strength: found.recovery_strength,
                    elapsed_hours: Some(elapsed_hours(challenge_at, found.record.created_at)),
                },
                None => RecoveryPeriod {
                    challenge: entry.record.clone(),
                    challenge_severity: severity,
                    recovery: None,
                    recovery_strength: None,
                    elapsed_hours: None,
                },
            };
            periods.push(period);
        }

        periods
    }
}

fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChallengeSeverity;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn at_hours(id: &str, hours: i64, content: &str) -> Record {
        Record::new(id, start() + Duration::hours(hours), content)
    }

    fn ids(periods: &[RecoveryPeriod]) -> Vec<(String, Option<String>)> {
        periods
            .iter()
            .map(|p| (p.challenge.id.clone(), p.recovery.as_ref().map(|r| r.id.clone())))
            .collect()
    }

    #[test]
    fn test_pairs_challenge_with_following_recovery() {
        let records = vec![
            at_hours("c1", 0, "").with_mood("stressed"),
            at_hours("r1", 10, "").with_mood("confident"),
        ];

        let periods = PairingEngine::default().pair(&records);

        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].elapsed_hours, Some(10.0));
        assert_eq!(periods[0].recovery.as_ref().map(|r| r.id.as_str()), Some("r1"));
        assert_eq!(periods[0].challenge_severity, ChallengeSeverity::Moderate);
    }

    #[test]
    fn test_recovery_outside_window_is_not_paired() {
        let records = vec![
            at_hours("c1", 0, "Another setback"),
            at_hours("n1", 24, "Filed paperwork"),
            at_hours("r1", 24 * 8, "Breakthrough with investors"),
        ];

        let periods = PairingEngine::default().pair(&records);

        assert_eq!(periods.len(), 1);
        assert!(periods[0].recovery.is_none());
        assert!(periods[0].elapsed_hours.is_none());
    }

    #[test]
    fn test_window_upper_bound_is_inclusive() {
        let records = vec![
            at_hours("c1", 0, "Another setback"),
            at_hours("r1", 24 * 7, "Breakthrough with investors"),
        ];

        let periods = PairingEngine::default().pair(&records);

        assert_eq!(periods[0].elapsed_hours, Some(168.0));
    }

    #[test]
    fn test_first_recovery_wins() {
        let records = vec![
            at_hours("c1", 0, "Another setback"),
            at_hours("r1", 30, "Feeling better"),
            at_hours("r2", 40, "Huge breakthrough"),
        ];

        let periods = PairingEngine::default().pair(&records);

        assert_eq!(ids(&periods), vec![("c1".to_string(), Some("r1".to_string()))]);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let records = vec![
            at_hours("r1", 5, "").with_mood("relieved"),
            at_hours("c2", 50, "").with_mood("anxious"),
            at_hours("c1", 0, "").with_mood("worried"),
        ];

        let periods = PairingEngine::default().pair(&records);

        assert_eq!(
            ids(&periods),
            vec![
                ("c1".to_string(), Some("r1".to_string())),
                ("c2".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_same_timestamp_is_not_a_recovery() {
        let records = vec![
            at_hours("c1", 0, "").with_mood("stressed"),
            at_hours("r0", 0, "").with_mood("hopeful"),
            at_hours("r1", 3, "").with_mood("hopeful"),
        ];

        let periods = PairingEngine::default().pair(&records);

        assert_eq!(ids(&periods), vec![("c1".to_string(), Some("r1".to_string()))]);
        assert_eq!(periods[0].elapsed_hours, Some(3.0));
    }

    #[test]
    fn test_consecutive_challenges_share_a_recovery() {
        let records = vec![
            at_hours("c1", 0, "").with_mood("frustrated"),
            at_hours("c2", 2, "").with_mood("sad"),
            at_hours("r1", 6, "").with_mood("optimistic"),
        ];

        let periods = PairingEngine::default().pair(&records);

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].elapsed_hours, Some(6.0));
        assert_eq!(periods[1].elapsed_hours, Some(4.0));
    }

    #[test]
    fn test_dual_entry_closes_and_opens_a_period() {
        let records = vec![
            at_hours("c1", 0, "Another setback").with_mood("stressed"),
            at_hours("d", 5, "Resolved the billing issue"),
            at_hours("r", 12, "Solved it").with_mood("confident"),
        ];

        let periods = PairingEngine::default().pair(&records);

        assert_eq!(
            ids(&periods),
            vec![
                ("c1".to_string(), Some("d".to_string())),
                ("d".to_string(), Some("r".to_string())),
            ]
        );
        assert_eq!(periods[0].elapsed_hours, Some(5.0));
        assert_eq!(periods[1].challenge_severity, ChallengeSeverity::Mild);
        assert_eq!(periods[1].elapsed_hours, Some(7.0));
    }

    #[test]
    fn test_oversized_window_does_not_panic() {
        let records = vec![
            at_hours("c1", 0, "").with_mood("stressed"),
            at_hours("r1", 24 * 400, "").with_mood("confident"),
        ];

        let engine = PairingEngine::new(EntryClassifier::default(), i64::MAX);
        let periods = engine.pair(&records);

        assert_eq!(periods[0].elapsed_hours, Some(9600.0));
    }

    #[test]
    fn test_custom_window() {
        let records = vec![
            at_hours("c1", 0, "").with_mood("stressed"),
            at_hours("r1", 49, "").with_mood("confident"),
        ];

        let engine = PairingEngine::new(EntryClassifier::default(), 2);
        let periods = engine.pair(&records);

        assert!(periods[0].recovery.is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(PairingEngine::default().pair(&[]).is_empty());
    }
}
