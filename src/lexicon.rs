//! Fixed word lists used by the entry classifier
//!
//! Lists are lowercase. Mood lists match whole (trimmed) mood labels, keyword
//! lists match as substrings of the entry content. Challenge and recovery
//! lists are disjoint.

use crate::types::{ChallengeSeverity, RecoveryStrength};

/// A tier of signals: mood labels plus content substrings
pub struct SignalTier {
    pub moods: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

impl SignalTier {
    /// True if the (already lowercased) mood or content hits this tier
    pub fn matches(&self, mood: Option<&str>, content: &str) -> bool {
        mood.is_some_and(|m| self.moods.contains(&m))
            || self.keywords.iter().any(|k| content.contains(k))
    }
}

pub const SEVERE_CHALLENGE: SignalTier = SignalTier {
    moods: &["burned out", "exhausted", "desperate", "devastated", "overwhelmed"],
    keywords: &[
        "crisis",
        "disaster",
        "devastat",
        "bankrupt",
        "catastroph",
        "major setback",
        "collapse",
        "burnout",
    ],
};

pub const MODERATE_CHALLENGE: SignalTier = SignalTier {
    moods: &["stressed", "frustrated", "anxious", "pressured", "worried", "sad"],
    keywords: &["setback", "failed", "failure", "struggle", "rejected", "lost a", "losing"],
};

pub const MILD_CHALLENGE: SignalTier = SignalTier {
    moods: &["conflicted", "uncertain", "tired", "disappointed", "discouraged"],
    keywords: &["problem", "difficult", "obstacle", "concern", "issue", "behind schedule"],
};

/// Challenge tiers in matching order
pub const CHALLENGE_TIERS: [(ChallengeSeverity, &SignalTier); 3] = [
    (ChallengeSeverity::Severe, &SEVERE_CHALLENGE),
    (ChallengeSeverity::Moderate, &MODERATE_CHALLENGE),
    (ChallengeSeverity::Mild, &MILD_CHALLENGE),
];

pub const STRONG_RECOVERY: SignalTier = SignalTier {
    moods: &["confident", "triumphant", "energized", "excited", "accomplished", "proud"],
    keywords: &[
        "breakthrough",
        "solved",
        "overcame",
        "turned around",
        "turned it around",
        "milestone",
        "best month",
    ],
};

pub const MODERATE_RECOVERY: SignalTier = SignalTier {
    moods: &["optimistic", "motivated", "hopeful", "relieved", "determined", "grateful"],
    keywords: &[
        "solution",
        "progress",
        "improv",
        "resolved",
        "recover",
        "bounce back",
        "bounced back",
        "back on track",
    ],
};

pub const MILD_RECOVERY: SignalTier = SignalTier {
    moods: &["calm", "content", "focused", "peaceful", "okay"],
    keywords: &["better", "learned", "manageable", "moving forward", "small win"],
};

/// Recovery tiers in matching order
pub const RECOVERY_TIERS: [(RecoveryStrength, &SignalTier); 3] = [
    (RecoveryStrength::Strong, &STRONG_RECOVERY),
    (RecoveryStrength::Moderate, &MODERATE_RECOVERY),
    (RecoveryStrength::Mild, &MILD_RECOVERY),
];

/// Category that marks an entry as a challenge on its own
pub const CHALLENGE_CATEGORY: &str = "challenge";

/// Categories that mark an entry as a recovery on their own
pub const RECOVERY_CATEGORIES: &[&str] = &["win", "success", "milestone", "growth", "recovery"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_and_recovery_moods_are_disjoint() {
        for (_, challenge) in CHALLENGE_TIERS {
            for (_, recovery) in RECOVERY_TIERS {
                for mood in challenge.moods {
                    assert!(!recovery.moods.contains(mood), "{mood} in both lists");
                }
            }
        }
    }

    #[test]
    fn test_all_lists_are_lowercase() {
        let tiers = CHALLENGE_TIERS
            .iter()
            .map(|(_, t)| *t)
            .chain(RECOVERY_TIERS.iter().map(|(_, t)| *t));
        for tier in tiers {
            for word in tier.moods.iter().chain(tier.keywords.iter()) {
                assert_eq!(*word, word.to_lowercase());
            }
        }
    }

    #[test]
    fn test_tier_matching() {
        assert!(SEVERE_CHALLENGE.matches(Some("exhausted"), ""));
        assert!(SEVERE_CHALLENGE.matches(None, "cash crisis this week"));
        assert!(!SEVERE_CHALLENGE.matches(Some("stressed"), "a quiet day"));
        assert!(MILD_RECOVERY.matches(None, "feeling better today"));
    }
}
