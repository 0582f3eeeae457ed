use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod content;

pub use content::{Content, ContentType};

/// Identifier of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a catalog entry (movie, show, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of a pairwise judgment the user preferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    A,
    B,
}

/// A piece of content the user has watched, with its running ranking score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedItem {
    pub user_id: UserId,
    pub content_id: ContentId,
    pub watched_at: DateTime<Utc>,
    pub score: f64,
    pub comparison_count: u32,
}

impl WatchedItem {
    /// Baseline score every newly watched item starts from
    pub const BASELINE_SCORE: f64 = 0.0;

    pub fn new(user_id: UserId, content_id: ContentId, watched_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            content_id,
            watched_at,
            score: Self::BASELINE_SCORE,
            comparison_count: 0,
        }
    }
}

/// A judgment as submitted, before the log assigns it an id and timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewComparison {
    pub user_id: UserId,
    pub content_id_a: ContentId,
    pub content_id_b: ContentId,
    pub winner: Winner,
}

/// An immutable, logged pairwise judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub id: u64,
    pub user_id: UserId,
    pub content_id_a: ContentId,
    pub content_id_b: ContentId,
    pub winner: Winner,
    pub submitted_at: DateTime<Utc>,
}

impl Comparison {
    /// Returns true if either side of the judgment is `content_id`
    pub fn involves(&self, content_id: ContentId) -> bool {
        self.content_id_a == content_id || self.content_id_b == content_id
    }
}

/// One row of a user's ranking, as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub content_id: ContentId,
    pub score: f64,
    pub comparison_count: u32,
    pub watched_at: DateTime<Utc>,
}

impl From<&WatchedItem> for RankingEntry {
    fn from(item: &WatchedItem) -> Self {
        Self {
            content_id: item.content_id,
            score: item.score,
            comparison_count: item.comparison_count,
            watched_at: item.watched_at,
        }
    }
}
