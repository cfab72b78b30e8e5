//! Per-session generation budget.
//!
//! Tracks cumulative generated-text volume against a soft and a hard
//! threshold. The state is a plain value threaded through each
//! resolution call rather than process-wide shared state, which keeps
//! sessions isolated and tests deterministic.
//!
//! Costs are a coarse token proxy: one unit per four characters,
//! rounded up. `spent` is monotonically non-decreasing within a
//! session and resets only at session start.

use serde::{Deserialize, Serialize};

/// Default soft threshold: warnings start here.
pub const DEFAULT_SOFT_CAP: u64 = 75_000;
/// Default hard threshold: no further spend is approved at or past this.
pub const DEFAULT_HARD_CAP: u64 = 100_000;

/// Conservative reservation required before starting the local tier.
pub const LOCAL_TIER_RESERVE: u64 = 500;
/// Conservative reservation required before starting the remote tier.
pub const REMOTE_TIER_RESERVE: u64 = 1_000;

/// Approximate the cost of a piece of text: `ceil(chars / 4)`.
pub fn approx_cost(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}

/// Where the current spend sits relative to the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetZone {
    /// Below the soft threshold.
    Normal,
    /// At or past soft, still below hard.
    SoftExceeded,
    /// At or past the hard threshold.
    HardExceeded,
}

/// The budget ledger for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetState {
    /// Units spent so far. Never decreases.
    spent: u64,
    /// Soft threshold (warning).
    soft: u64,
    /// Hard threshold (blocking).
    hard: u64,
}

impl Default for BudgetState {
    fn default() -> Self {
        Self::new(DEFAULT_SOFT_CAP, DEFAULT_HARD_CAP)
    }
}

impl BudgetState {
    /// Create a fresh ledger. `soft` is clamped to `hard`.
    pub fn new(soft: u64, hard: u64) -> Self {
        Self {
            spent: 0,
            soft: soft.min(hard),
            hard,
        }
    }

    pub fn spent(&self) -> u64 {
        self.spent
    }

    pub fn soft(&self) -> u64 {
        self.soft
    }

    pub fn hard(&self) -> u64 {
        self.hard
    }

    /// Whether `n` more units fit under the hard cap.
    pub fn can_spend(&self, n: u64) -> bool {
        self.spent.saturating_add(n) <= self.hard
    }

    /// Record `n` accepted units. Callers call this exactly once per
    /// accepted chunk, after `can_spend` approved it.
    pub fn note(&mut self, n: u64) {
        self.spent = self.spent.saturating_add(n);
        if self.spent >= self.soft {
            tracing::debug!(spent = self.spent, soft = self.soft, "soft budget threshold crossed");
        }
    }

    /// Units remaining under the hard cap.
    pub fn headroom(&self) -> u64 {
        self.hard.saturating_sub(self.spent)
    }

    /// True while `soft <= spent < hard`.
    pub fn soft_reached(&self) -> bool {
        self.spent >= self.soft && self.spent < self.hard
    }

    pub fn zone(&self) -> BudgetZone {
        if self.spent >= self.hard {
            BudgetZone::HardExceeded
        } else if self.spent >= self.soft {
            BudgetZone::SoftExceeded
        } else {
            BudgetZone::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_cost_rounds_up() {
        assert_eq!(approx_cost(""), 0);
        assert_eq!(approx_cost("a"), 1);
        assert_eq!(approx_cost("abcd"), 1);
        assert_eq!(approx_cost("abcde"), 2);
        assert_eq!(approx_cost(&"x".repeat(100)), 25);
    }

    #[test]
    fn approx_cost_counts_chars_not_bytes() {
        // four 3-byte chars are still one unit
        assert_eq!(approx_cost("éééé"), 1);
    }

    #[test]
    fn spent_is_sum_of_notes() {
        let mut budget = BudgetState::default();
        let costs = [3u64, 0, 250, 1, 999];
        for c in costs {
            budget.note(c);
        }
        assert_eq!(budget.spent(), costs.iter().sum::<u64>());
    }

    #[test]
    fn can_spend_consistent_with_hard_cap() {
        let mut budget = BudgetState::new(DEFAULT_SOFT_CAP, DEFAULT_HARD_CAP);
        budget.note(99_990);
        assert!(budget.can_spend(10));
        assert!(!budget.can_spend(11));
        assert_eq!(budget.headroom(), 10);
    }

    #[test]
    fn zones() {
        let mut budget = BudgetState::new(100, 200);
        assert_eq!(budget.zone(), BudgetZone::Normal);
        assert!(!budget.soft_reached());

        budget.note(100);
        assert_eq!(budget.zone(), BudgetZone::SoftExceeded);
        assert!(budget.soft_reached());

        budget.note(100);
        assert_eq!(budget.zone(), BudgetZone::HardExceeded);
        assert!(!budget.soft_reached());
        assert!(!budget.can_spend(1));
        assert!(budget.can_spend(0));
    }

    #[test]
    fn soft_clamped_to_hard() {
        let budget = BudgetState::new(500, 100);
        assert_eq!(budget.soft(), 100);
    }

    #[test]
    fn note_never_overflows() {
        let mut budget = BudgetState::new(10, 20);
        budget.note(u64::MAX);
        budget.note(u64::MAX);
        assert_eq!(budget.spent(), u64::MAX);
        assert_eq!(budget.headroom(), 0);
    }
}
