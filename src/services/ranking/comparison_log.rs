use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{
    error::RankingError,
    models::{Comparison, ContentId, NewComparison, UserId},
};

use super::ScoreStore;

/// Source of comparison ids shared by every user's log.
///
/// Ids are unique across users and increase in commit order.
#[derive(Debug, Clone, Default)]
pub struct ComparisonSequence(Arc<AtomicU64>);

impl ComparisonSequence {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Append-only record of a user's pairwise judgments
#[derive(Debug, Clone)]
pub struct ComparisonLog {
    user_id: UserId,
    sequence: ComparisonSequence,
    entries: Vec<Comparison>,
}

impl ComparisonLog {
    pub fn new(user_id: UserId, sequence: ComparisonSequence) -> Self {
        Self {
            user_id,
            sequence,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks a judgment against the user's watched items without recording it
    pub fn validate(&self, comparison: &NewComparison, watched: &ScoreStore) -> Result<(), RankingError> {
        if comparison.content_id_a == comparison.content_id_b {
            return Err(RankingError::SelfComparison(comparison.content_id_a));
        }

        for content_id in [comparison.content_id_a, comparison.content_id_b] {
            if comparison.user_id != self.user_id || !watched.contains(content_id) {
                return Err(RankingError::InvalidComparison {
                    user_id: comparison.user_id,
                    content_id,
                });
            }
        }

        Ok(())
    }

    /// Validates and records a judgment, assigning its id and submission time.
    ///
    /// Nothing is recorded when validation fails.
    pub fn append(
        &mut self,
        comparison: NewComparison,
        watched: &ScoreStore,
    ) -> Result<&Comparison, RankingError> {
        self.validate(&comparison, watched)?;

        let entry = Comparison {
            id: self.sequence.next(),
            user_id: comparison.user_id,
            content_id_a: comparison.content_id_a,
            content_id_b: comparison.content_id_b,
            winner: comparison.winner,
            submitted_at: Utc::now(),
        };
        self.entries.push(entry);

        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Every judgment touching `content_id`, in submission order
    pub fn history(&self, content_id: ContentId) -> impl Iterator<Item = &Comparison> + Clone {
        self.entries
            .iter()
            .filter(move |comparison| comparison.involves(content_id))
    }

    /// The full log in submission order
    pub fn entries(&self) -> &[Comparison] {
        &self.entries
    }
}
