use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{
    error::RankingError,
    models::{ContentId, RankingEntry, UserId, WatchedItem},
};

/// A user's ranking, ordered best first
pub type RankingSnapshot = Vec<RankingEntry>;

/// Per-user cache of ranking scores, one `WatchedItem` per watched content
#[derive(Debug, Clone)]
pub struct ScoreStore {
    user_id: UserId,
    items: HashMap<ContentId, WatchedItem>,
}

impl ScoreStore {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            items: HashMap::new(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, content_id: ContentId) -> bool {
        self.items.contains_key(&content_id)
    }

    pub fn item(&self, content_id: ContentId) -> Option<&WatchedItem> {
        self.items.get(&content_id)
    }

    pub fn items(&self) -> impl Iterator<Item = &WatchedItem> + Clone {
        self.items.values()
    }

    /// Current score of a watched item
    pub fn get(&self, content_id: ContentId) -> Result<f64, RankingError> {
        self.items
            .get(&content_id)
            .map(|item| item.score)
            .ok_or_else(|| self.not_found(content_id))
    }

    /// Creates a baseline `WatchedItem`.
    ///
    /// Returns false and leaves the existing item untouched if the content was
    /// already watched.
    pub fn initialize(&mut self, content_id: ContentId, watched_at: DateTime<Utc>) -> bool {
        if self.items.contains_key(&content_id) {
            return false;
        }

        self.items.insert(
            content_id,
            WatchedItem::new(self.user_id, content_id, watched_at),
        );
        true
    }

    /// Adds `delta` to the score and counts one more comparison. Returns the new score.
    pub fn apply_delta(&mut self, content_id: ContentId, delta: f64) -> Result<f64, RankingError> {
        let not_found = self.not_found(content_id);
        let item = self.items.get_mut(&content_id).ok_or(not_found)?;

        item.score += delta;
        item.comparison_count += 1;
        Ok(item.score)
    }

    /// Overwrites a cached score with a replayed value
    pub(crate) fn restore(
        &mut self,
        content_id: ContentId,
        score: f64,
        comparison_count: u32,
    ) -> Result<(), RankingError> {
        let not_found = self.not_found(content_id);
        let item = self.items.get_mut(&content_id).ok_or(not_found)?;

        item.score = score;
        item.comparison_count = comparison_count;
        Ok(())
    }

    /// All watched items ordered by descending score, then most recently
    /// watched, then ascending content id
    pub fn snapshot(&self) -> RankingSnapshot {
        let mut items: Vec<&WatchedItem> = self.items.values().collect();
        items.sort_by(|a, b| ranking_order(a, b));
        items.into_iter().map(RankingEntry::from).collect()
    }

    fn not_found(&self, content_id: ContentId) -> RankingError {
        RankingError::NotFound {
            user_id: self.user_id,
            content_id,
        }
    }
}

/// Strict total order used for rankings
pub fn ranking_order(a: &WatchedItem, b: &WatchedItem) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.watched_at.cmp(&a.watched_at))
        .then_with(|| a.content_id.cmp(&b.content_id))
}
