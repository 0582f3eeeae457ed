use std::collections::HashMap;

use crate::models::{Comparison, ContentId, WatchedItem, Winner};

/// Bounded pairwise score update.
///
/// The preferred item gains `k_win` and the other item loses `k_loss`. The
/// asymmetry lets a ranking converge faster than symmetric ELO while heavily
/// compared items drift less. Scores are an unbounded relative signal and are
/// never clamped or normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateRule {
    pub k_win: f64,
    pub k_loss: f64,
}

impl Default for UpdateRule {
    fn default() -> Self {
        Self::new(Self::DEFAULT_K_WIN, Self::DEFAULT_K_LOSS)
    }
}

impl UpdateRule {
    pub const DEFAULT_K_WIN: f64 = 10.0;
    pub const DEFAULT_K_LOSS: f64 = 5.0;

    pub fn new(k_win: f64, k_loss: f64) -> Self {
        Self { k_win, k_loss }
    }

    /// Returns the new `(score_a, score_b)` after a judgment.
    pub fn update(&self, score_a: f64, score_b: f64, winner: Winner) -> (f64, f64) {
        let (delta_a, delta_b) = self.deltas(winner);
        (score_a + delta_a, score_b + delta_b)
    }

    /// Score deltas applied to `(a, b)` for a judgment
    pub fn deltas(&self, winner: Winner) -> (f64, f64) {
        match winner {
            Winner::A => (self.k_win, -self.k_loss),
            Winner::B => (-self.k_loss, self.k_win),
        }
    }

    /// Folds an ordered comparison sequence from baseline.
    ///
    /// Returns `(score, comparison_count)` for every content id that appears in
    /// the sequence. Items that never appear keep their baseline.
    pub fn replay<'a, I>(&self, comparisons: I) -> HashMap<ContentId, (f64, u32)>
    where
        I: IntoIterator<Item = &'a Comparison>,
    {
        let mut state: HashMap<ContentId, (f64, u32)> = HashMap::new();

        for comparison in comparisons {
            let (score_a, _) = *state
                .entry(comparison.content_id_a)
                .or_insert((WatchedItem::BASELINE_SCORE, 0));
            let (score_b, _) = *state
                .entry(comparison.content_id_b)
                .or_insert((WatchedItem::BASELINE_SCORE, 0));

            let (new_a, new_b) = self.update(score_a, score_b, comparison.winner);

            if let Some(entry) = state.get_mut(&comparison.content_id_a) {
                entry.0 = new_a;
                entry.1 += 1;
            }
            if let Some(entry) = state.get_mut(&comparison.content_id_b) {
                entry.0 = new_b;
                entry.1 += 1;
            }
        }

        state
    }
}
