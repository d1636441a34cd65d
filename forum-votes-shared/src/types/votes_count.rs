use serde::{Deserialize, Serialize};
use crate::types::VoteType;

/// The aggregated helpful / not helpful counters of a votable item.
///
/// Counters are a materialized view over the item's vote records and are
/// never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotesCount {
    pub helpful: i64,
    pub not_helpful: i64,
}

impl VotesCount {
    pub fn new(helpful: i64, not_helpful: i64) -> Self {
        Self { helpful, not_helpful }
    }

    pub fn total(&self) -> i64 {
        self.helpful + self.not_helpful
    }

    /// Share of helpful votes in percent, `0.0` when nobody voted.
    pub fn helpful_percentage(&self) -> f64 {
        let total = self.total();
        if total > 0 {
            self.helpful as f64 / total as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Applies a delta, returning `None` if either counter would go negative.
    pub fn checked_apply(&self, delta: VoteDelta) -> Option<VotesCount> {
        let helpful = self.helpful.checked_add(delta.helpful)?;
        let not_helpful = self.not_helpful.checked_add(delta.not_helpful)?;
        (helpful >= 0 && not_helpful >= 0).then_some(VotesCount { helpful, not_helpful })
    }

    /// Applies a delta, clamping each counter at zero.
    pub fn saturating_apply(&self, delta: VoteDelta) -> VotesCount {
        VotesCount {
            helpful: (self.helpful + delta.helpful).max(0),
            not_helpful: (self.not_helpful + delta.not_helpful).max(0),
        }
    }

    /// Increments the counter matching `vote`.
    pub fn record(&mut self, vote: VoteType) {
        match vote {
            VoteType::Helpful => self.helpful += 1,
            VoteType::NotHelpful => self.not_helpful += 1,
        }
    }
}

/// Relative change applied to an item's counters by one vote operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDelta {
    pub helpful: i64,
    pub not_helpful: i64,
}

impl VoteDelta {
    pub fn increment(vote: VoteType) -> Self {
        Self::signed(vote, 1)
    }

    pub fn decrement(vote: VoteType) -> Self {
        Self::signed(vote, -1)
    }

    fn signed(vote: VoteType, amount: i64) -> Self {
        match vote {
            VoteType::Helpful => VoteDelta { helpful: amount, not_helpful: 0 },
            VoteType::NotHelpful => VoteDelta { helpful: 0, not_helpful: amount },
        }
    }

    /// Removes the whole contribution of `count`, used when an item is deleted.
    pub fn removing(count: VotesCount) -> Self {
        VoteDelta {
            helpful: -count.helpful,
            not_helpful: -count.not_helpful,
        }
    }

    pub fn combine(self, other: VoteDelta) -> Self {
        VoteDelta {
            helpful: self.helpful + other.helpful,
            not_helpful: self.not_helpful + other.not_helpful,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.helpful == 0 && self.not_helpful == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_apply_rejects_underflow() {
        let count = VotesCount::new(0, 1);
        assert_eq!(count.checked_apply(VoteDelta::decrement(VoteType::Helpful)), None);
        assert_eq!(
            count.checked_apply(VoteDelta::decrement(VoteType::NotHelpful)),
            Some(VotesCount::new(0, 0))
        );
    }

    #[test]
    fn test_saturating_apply_clamps() {
        let count = VotesCount::new(0, 0);
        assert_eq!(
            count.saturating_apply(VoteDelta::decrement(VoteType::Helpful)),
            VotesCount::new(0, 0)
        );
    }

    #[test]
    fn test_helpful_percentage() {
        assert_eq!(VotesCount::new(0, 0).helpful_percentage(), 0.0);
        assert_eq!(VotesCount::new(3, 1).helpful_percentage(), 75.0);
    }

    #[test]
    fn test_combine_switch_delta() {
        let delta = VoteDelta::increment(VoteType::NotHelpful)
            .combine(VoteDelta::decrement(VoteType::Helpful));
        assert_eq!(delta, VoteDelta { helpful: -1, not_helpful: 1 });
        assert!(!delta.is_zero());
        assert!(VoteDelta::default().is_zero());
    }
}
