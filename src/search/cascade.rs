//! The fallback cascade as an explicit state machine.
//!
//! ```text
//! NotStarted --primary--> PrimaryTried --secondary--> SecondaryTried --local--> LocalAugmented
//!                              |                            |                        |
//!                              +----------------------------+------------------------+--> Done
//! ```
//!
//! The secondary tier runs only when the primary tier failed or returned
//! fewer than `min_primary_hits`; the local tier runs only while fewer than
//! `min_combined_hits` have been collected. Skipped states are jumped over.

use serde::{Deserialize, Serialize};

use crate::search::result::ResultTier;

/// Where a search is in the fallback cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    NotStarted,
    PrimaryTried,
    SecondaryTried,
    LocalAugmented,
    Done,
}

/// What running one tier produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome {
    /// The tier answered with this many usable hits.
    Hits(usize),
    /// The tier errored or timed out.
    Failed,
    /// The tier is not configured.
    Skipped,
}

/// Hit counts that decide whether later tiers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeThresholds {
    /// Fewer primary hits than this triggers the secondary tier.
    pub min_primary_hits: usize,
    /// Fewer combined hits than this triggers the local tier.
    pub min_combined_hits: usize,
}

impl Default for CascadeThresholds {
    fn default() -> Self {
        CascadeThresholds {
            min_primary_hits: 3,
            min_combined_hits: 5,
        }
    }
}

/// Drives one search through the tiers.
///
/// Callers loop on [`Cascade::next_tier`], run the tier it names and report
/// the result with [`Cascade::record`]:
///
/// ```
/// use newsfind::search::cascade::{Cascade, CascadeState, CascadeThresholds, TierOutcome};
/// use newsfind::search::result::ResultTier;
///
/// let mut cascade = Cascade::new(CascadeThresholds::default());
/// assert_eq!(cascade.next_tier(), Some(ResultTier::Primary));
/// cascade.record(ResultTier::Primary, TierOutcome::Hits(10));
/// assert_eq!(cascade.next_tier(), None);
/// assert_eq!(cascade.state(), CascadeState::Done);
/// ```
#[derive(Debug, Clone)]
pub struct Cascade {
    state: CascadeState,
    thresholds: CascadeThresholds,
    primary_hits: Option<usize>,
    combined_hits: usize,
    failed: Vec<ResultTier>,
}

impl Cascade {
    /// Start a new cascade.
    pub fn new(thresholds: CascadeThresholds) -> Self {
        Cascade {
            state: CascadeState::NotStarted,
            thresholds,
            primary_hits: None,
            combined_hits: 0,
            failed: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> CascadeState {
        self.state
    }

    /// Hits collected so far across tiers.
    pub fn combined_hits(&self) -> usize {
        self.combined_hits
    }

    /// Tiers that errored or timed out, in the order they were tried.
    pub fn failed_tiers(&self) -> &[ResultTier] {
        &self.failed
    }

    /// The tier to run next, or `None` once the cascade is done.
    pub fn next_tier(&self) -> Option<ResultTier> {
        match self.state {
            CascadeState::NotStarted => Some(ResultTier::Primary),
            CascadeState::PrimaryTried => {
                let primary_sufficient = self
                    .primary_hits
                    .is_some_and(|hits| hits >= self.thresholds.min_primary_hits);
                if !primary_sufficient {
                    Some(ResultTier::Secondary)
                } else if self.needs_local() {
                    Some(ResultTier::Local)
                } else {
                    None
                }
            }
            CascadeState::SecondaryTried => self.needs_local().then_some(ResultTier::Local),
            CascadeState::LocalAugmented | CascadeState::Done => None,
        }
    }

    /// Record the outcome of `tier` and advance.
    pub fn record(&mut self, tier: ResultTier, outcome: TierOutcome) {
        match outcome {
            TierOutcome::Hits(hits) => {
                self.combined_hits += hits;
                if tier == ResultTier::Primary {
                    self.primary_hits = Some(hits);
                }
            }
            TierOutcome::Failed => self.failed.push(tier),
            TierOutcome::Skipped => {}
        }

        self.state = match tier {
            ResultTier::Primary => CascadeState::PrimaryTried,
            ResultTier::Secondary => CascadeState::SecondaryTried,
            ResultTier::Local => CascadeState::LocalAugmented,
        };
        if self.next_tier().is_none() {
            self.state = CascadeState::Done;
        }
    }

    fn needs_local(&self) -> bool {
        self.combined_hits < self.thresholds.min_combined_hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(outcomes: &[(ResultTier, TierOutcome)]) -> (Vec<ResultTier>, Cascade) {
        let mut cascade = Cascade::new(CascadeThresholds::default());
        let mut tried = Vec::new();
        let mut outcomes = outcomes.iter();
        while let Some(tier) = cascade.next_tier() {
            let (expected, outcome) = outcomes
                .next()
                .copied()
                .unwrap_or((tier, TierOutcome::Hits(0)));
            assert_eq!(expected, tier);
            tried.push(tier);
            cascade.record(tier, outcome);
        }
        (tried, cascade)
    }

    #[test]
    fn test_primary_sufficient() {
        let (tried, cascade) = run(&[(ResultTier::Primary, TierOutcome::Hits(5))]);
        assert_eq!(tried, vec![ResultTier::Primary]);
        assert_eq!(cascade.state(), CascadeState::Done);
    }

    #[test]
    fn test_primary_enough_but_combined_short_skips_secondary() {
        let (tried, _) = run(&[
            (ResultTier::Primary, TierOutcome::Hits(3)),
            (ResultTier::Local, TierOutcome::Hits(1)),
        ]);
        assert_eq!(tried, vec![ResultTier::Primary, ResultTier::Local]);
    }

    #[test]
    fn test_primary_short_secondary_fills() {
        let (tried, cascade) = run(&[
            (ResultTier::Primary, TierOutcome::Hits(2)),
            (ResultTier::Secondary, TierOutcome::Hits(4)),
        ]);
        assert_eq!(tried, vec![ResultTier::Primary, ResultTier::Secondary]);
        assert_eq!(cascade.combined_hits(), 6);
        assert!(cascade.failed_tiers().is_empty());
    }

    #[test]
    fn test_everything_fails() {
        let (tried, cascade) = run(&[
            (ResultTier::Primary, TierOutcome::Failed),
            (ResultTier::Secondary, TierOutcome::Failed),
            (ResultTier::Local, TierOutcome::Hits(0)),
        ]);
        assert_eq!(tried, ResultTier::ALL.to_vec());
        assert_eq!(
            cascade.failed_tiers(),
            &[ResultTier::Primary, ResultTier::Secondary]
        );
        assert_eq!(cascade.state(), CascadeState::Done);
    }

    #[test]
    fn test_skipped_primary_falls_through() {
        let (tried, cascade) = run(&[
            (ResultTier::Primary, TierOutcome::Skipped),
            (ResultTier::Secondary, TierOutcome::Skipped),
            (ResultTier::Local, TierOutcome::Hits(2)),
        ]);
        assert_eq!(tried.len(), 3);
        assert!(cascade.failed_tiers().is_empty());
    }
}
