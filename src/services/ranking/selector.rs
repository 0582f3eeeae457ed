use crate::models::{ContentId, WatchedItem};

use super::ScoreStore;

/// Picks comparison partners for a newly watched item.
///
/// Least-compared items come first so the ranking converges evenly; ties go to
/// the most recently watched, then to the lower content id.
#[derive(Debug, Clone, Copy)]
pub struct CandidateSelector {
    max_count: usize,
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_COUNT)
    }
}

impl CandidateSelector {
    pub const DEFAULT_MAX_COUNT: usize = 3;

    pub fn new(max_count: usize) -> Self {
        Self { max_count }
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn select_candidates(&self, store: &ScoreStore, new_content_id: ContentId) -> Vec<ContentId> {
        let mut candidates: Vec<&WatchedItem> = store
            .items()
            .filter(|item| item.content_id != new_content_id)
            .collect();

        candidates.sort_by(|a, b| {
            a.comparison_count
                .cmp(&b.comparison_count)
                .then_with(|| b.watched_at.cmp(&a.watched_at))
                .then_with(|| a.content_id.cmp(&b.content_id))
        });

        candidates
            .into_iter()
            .take(self.max_count)
            .map(|item| item.content_id)
            .collect()
    }
}
