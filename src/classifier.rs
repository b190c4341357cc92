//! Entry classification
//!
//! Labels each record as a challenge and/or a recovery, with a severity or
//! strength tier. Matching is case-insensitive against the fixed lists in
//! [`crate::lexicon`]; missing fields simply contribute no signal.

use crate::config::ScoringConfig;
use crate::lexicon::{CHALLENGE_CATEGORY, CHALLENGE_TIERS, RECOVERY_CATEGORIES, RECOVERY_TIERS};
use crate::types::{ChallengeSeverity, ClassifiedRecord, Record, RecoveryStrength};

/// Classifier for journal entries
#[derive(Debug, Clone)]
pub struct EntryClassifier {
    recovery_confidence_threshold: Option<f64>,
}

impl Default for EntryClassifier {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl EntryClassifier {
    /// Create a classifier; `None` turns off confidence-only recoveries
    pub fn new(recovery_confidence_threshold: Option<f64>) -> Self {
        Self {
            recovery_confidence_threshold,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.recovery_confidence_threshold)
    }

    /// Classify a single record
    pub fn classify(&self, record: &Record) -> ClassifiedRecord {
        let signals = EntrySignals::from_record(record);

        let challenge_severity = challenge_severity(&signals);
        let recovery_strength = self.recovery_strength(&signals, record.confidence);

        ClassifiedRecord {
            record: record.clone(),
            is_challenge: challenge_severity.is_some(),
            challenge_severity,
            is_recovery: recovery_strength.is_some(),
            recovery_strength,
        }
    }

    /// Classify every record, preserving input order
    pub fn classify_all(&self, records: &[Record]) -> Vec<ClassifiedRecord> {
        records.iter().map(|r| self.classify(r)).collect()
    }

    fn recovery_strength(
        &self,
        signals: &EntrySignals,
        confidence: Option<f64>,
    ) -> Option<RecoveryStrength> {
        for (strength, tier) in RECOVERY_TIERS {
            if tier.matches(signals.mood.as_deref(), &signals.content) {
                return Some(strength);
            }
        }

        if signals
            .category
            .as_deref()
            .is_some_and(|c| RECOVERY_CATEGORIES.contains(&c))
        {
            return Some(RecoveryStrength::Moderate);
        }

        match (confidence, self.recovery_confidence_threshold) {
            (Some(conf), Some(threshold)) if conf >= threshold => Some(RecoveryStrength::Moderate),
            _ => None,
        }
    }
}

/// Lowercased, whitespace-normalized view of the fields the lists match on
struct EntrySignals {
    mood: Option<String>,
    category: Option<String>,
    content: String,
}

impl EntrySignals {
    fn from_record(record: &Record) -> Self {
        Self {
            mood: record.mood.as_deref().and_then(normalize_label),
            category: record.category.as_deref().and_then(normalize_label),
            content: record.content.to_lowercase(),
        }
    }
}

fn challenge_severity(signals: &EntrySignals) -> Option<ChallengeSeverity> {
    for (severity, tier) in CHALLENGE_TIERS {
        if tier.matches(signals.mood.as_deref(), &signals.content) {
            return Some(severity);
        }
    }

    if signals.category.as_deref() == Some(CHALLENGE_CATEGORY) {
        return Some(ChallengeSeverity::Moderate);
    }

    None
}

/// Lowercase a label and fold `_`/`-` separators into single spaces.
///
/// Blank labels become `None`.
fn normalize_label(label: &str) -> Option<String> {
    let folded: String = label
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    let normalized = folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryLabel;
    use chrono::{TimeZone, Utc};

    fn entry(content: &str) -> Record {
        Record::new("e1", Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(), content)
    }

    #[test]
    fn test_challenge_from_mood() {
        let classifier = EntryClassifier::default();
        let classified = classifier.classify(&entry("Quarterly review").with_mood("Stressed"));

        assert!(classified.is_challenge);
        assert_eq!(classified.challenge_severity, Some(ChallengeSeverity::Moderate));
        assert!(!classified.is_recovery);
    }

    #[test]
    fn test_severity_order_prefers_severe() {
        let classifier = EntryClassifier::default();
        // "tired" alone is mild, but a crisis in the text is severe
        let classified = classifier.classify(&entry("Cash flow crisis, small problem with payroll").with_mood("tired"));

        assert_eq!(classified.challenge_severity, Some(ChallengeSeverity::Severe));
    }

    #[test]
    fn test_multi_word_mood_normalization() {
        let classifier = EntryClassifier::default();
        let classified = classifier.classify(&entry("").with_mood("  Burned_Out "));

        assert_eq!(classified.challenge_severity, Some(ChallengeSeverity::Severe));
    }

    #[test]
    fn test_challenge_category_defaults_to_moderate() {
        let classifier = EntryClassifier::default();
        let classified = classifier.classify(&entry("Notes from today").with_category("Challenge"));

        assert!(classified.is_challenge);
        assert_eq!(classified.challenge_severity, Some(ChallengeSeverity::Moderate));
    }

    #[test]
    fn test_recovery_strength_tiers() {
        let classifier = EntryClassifier::default();

        let strong = classifier.classify(&entry("Big breakthrough with the new supplier"));
        assert_eq!(strong.recovery_strength, Some(RecoveryStrength::Strong));

        let moderate = classifier.classify(&entry("Some progress on the launch"));
        assert_eq!(moderate.recovery_strength, Some(RecoveryStrength::Moderate));

        let mild = classifier.classify(&entry("Feeling a little better"));
        assert_eq!(mild.recovery_strength, Some(RecoveryStrength::Mild));
    }

    #[test]
    fn test_recovery_category() {
        let classifier = EntryClassifier::default();
        let classified = classifier.classify(&entry("Signed the lease").with_category("win"));

        assert!(classified.is_recovery);
        assert_eq!(classified.recovery_strength, Some(RecoveryStrength::Moderate));
    }

    #[test]
    fn test_confidence_alone_qualifies_as_recovery() {
        let classifier = EntryClassifier::default();

        let high = classifier.classify(&entry("Regular day").with_confidence(80.0));
        assert!(high.is_recovery);
        assert_eq!(high.recovery_strength, Some(RecoveryStrength::Moderate));

        let boundary = classifier.classify(&entry("Regular day").with_confidence(75.0));
        assert!(boundary.is_recovery);

        let low = classifier.classify(&entry("Regular day").with_confidence(74.9));
        assert!(!low.is_recovery);
    }

    #[test]
    fn test_confidence_does_not_mask_stronger_signal() {
        let classifier = EntryClassifier::default();
        let classified = classifier.classify(&entry("Solved it").with_confidence(90.0));

        assert_eq!(classified.recovery_strength, Some(RecoveryStrength::Strong));
    }

    #[test]
    fn test_confidence_rule_can_be_disabled() {
        let classifier = EntryClassifier::new(None);
        let classified = classifier.classify(&entry("Regular day").with_confidence(99.0));

        assert!(!classified.is_recovery);
    }

    #[test]
    fn test_neutral_entry() {
        let classifier = EntryClassifier::default();
        let classified = classifier.classify(&entry("Ordered new business cards"));

        assert!(!classified.is_challenge);
        assert!(!classified.is_recovery);
        assert_eq!(classified.label(), EntryLabel::Neutral);
    }

    #[test]
    fn test_blank_fields_degrade_to_neutral() {
        let classifier = EntryClassifier::default();
        let classified = classifier.classify(&entry("").with_mood("   ").with_category(""));

        assert_eq!(classified.label(), EntryLabel::Neutral);
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let classifier = EntryClassifier::default();
        let classified = classifier.classify(&entry("MAJOR SETBACK with the bank"));

        assert_eq!(classified.challenge_severity, Some(ChallengeSeverity::Severe));
    }

    #[test]
    fn test_label_prefers_challenge() {
        let classifier = EntryClassifier::default();
        let classified = classifier.classify(&entry("Resolved the billing issue"));

        assert!(classified.is_challenge);
        assert!(classified.is_recovery);
        assert_eq!(classified.label(), EntryLabel::Challenge);
    }
}
