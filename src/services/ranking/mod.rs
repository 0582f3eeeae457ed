//! Pairwise-comparison ranking engine
//!
//! A user's ranking is built from judgments between two watched items rather
//! than absolute ratings. The comparison log is the source of truth; per-item
//! scores are a cache that can always be rebuilt by replaying the log from
//! baseline with the configured `UpdateRule`.
//!
//! Per-user state is owned by [`RankingService`] and cannot be reached around it:
//!
//! ```compile_fail
//! use watchrank::services::ranking::UserRankings;
//! ```

pub mod comparison_log;
pub mod score_store;
pub mod selector;
pub mod service;
pub mod updater;

pub use comparison_log::{ComparisonLog, ComparisonSequence};
pub use score_store::{ranking_order, RankingSnapshot, ScoreStore};
pub use selector::CandidateSelector;
pub use service::{RankingService, ReplayReport};
pub use updater::UpdateRule;
