use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::RankingError,
    models::{Comparison, Content, ContentId, NewComparison, UserId, WatchedItem, Winner},
    services::catalog::{CatalogError, ContentCatalog},
};

use super::{
    CandidateSelector, ComparisonLog, ComparisonSequence, RankingSnapshot, ScoreStore, UpdateRule,
};

/// One user's ranking state: the score cache and the log it is derived from
#[derive(Debug)]
struct UserRankings {
    scores: ScoreStore,
    log: ComparisonLog,
}

impl UserRankings {
    fn new(user_id: UserId, sequence: ComparisonSequence) -> Self {
        Self {
            scores: ScoreStore::new(user_id),
            log: ComparisonLog::new(user_id, sequence),
        }
    }
}

/// Result of checking a user's score cache against a replay of their log
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    pub comparisons: usize,
    pub mismatched: Vec<ContentId>,
}

impl ReplayReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatched.is_empty()
    }
}

/// Sole mutator of ranking state.
///
/// Each user's `UserRankings` sits behind its own lock, so users never contend
/// with each other. A submission holds the write lock from validation until
/// both deltas are applied; readers take the read lock and therefore never see
/// half of a submission. Catalog calls happen before any lock is taken.
pub struct RankingService {
    users: DashMap<UserId, Arc<RwLock<UserRankings>>>,
    catalog: Arc<dyn ContentCatalog>,
    catalog_timeout: Duration,
    rule: UpdateRule,
    selector: CandidateSelector,
    sequence: ComparisonSequence,
}

impl RankingService {
    pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new(catalog: Arc<dyn ContentCatalog>) -> Self {
        Self {
            users: DashMap::new(),
            catalog,
            catalog_timeout: Self::DEFAULT_CATALOG_TIMEOUT,
            rule: UpdateRule::default(),
            selector: CandidateSelector::default(),
            sequence: ComparisonSequence::new(),
        }
    }

    pub fn with_rule(mut self, rule: UpdateRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_max_candidates(mut self, max_count: usize) -> Self {
        self.selector = CandidateSelector::new(max_count);
        self
    }

    pub fn with_catalog_timeout(mut self, timeout: Duration) -> Self {
        self.catalog_timeout = timeout;
        self
    }

    pub fn rule(&self) -> UpdateRule {
        self.rule
    }

    fn ledger(&self, user_id: UserId) -> Arc<RwLock<UserRankings>> {
        self.users
            .entry(user_id)
            .or_insert_with(|| {
                Arc::new(RwLock::new(UserRankings::new(user_id, self.sequence.clone())))
            })
            .clone()
    }

    fn existing_ledger(&self, user_id: UserId) -> Option<Arc<RwLock<UserRankings>>> {
        self.users.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Awaits a catalog call, bounded by the catalog timeout. Failures and
    /// timeouts both surface as `Unavailable`.
    async fn call_catalog<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, CatalogError>>,
    ) -> Result<T, RankingError> {
        match tokio::time::timeout(self.catalog_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(
                    catalog = self.catalog.name(),
                    operation,
                    error = %e,
                    "Catalog call failed"
                );
                Err(RankingError::Unavailable(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    catalog = self.catalog.name(),
                    operation,
                    timeout_ms = self.catalog_timeout.as_millis() as u64,
                    "Catalog call timed out"
                );
                Err(RankingError::Unavailable(format!(
                    "catalog {} timed out",
                    operation
                )))
            }
        }
    }

    async fn ensure_content_exists(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<(), RankingError> {
        let exists = self
            .call_catalog("lookup", self.catalog.content_exists(content_id))
            .await?;

        if exists {
            Ok(())
        } else {
            Err(RankingError::NotFound {
                user_id,
                content_id,
            })
        }
    }

    /// Catalog entry for `content_id`, `None` if the catalog has no such id
    pub async fn content(&self, content_id: ContentId) -> Result<Option<Content>, RankingError> {
        self.call_catalog("lookup", self.catalog.get_content(content_id)).await
    }

    /// Every catalog entry, ordered by id
    pub async fn catalog_contents(&self) -> Result<Vec<Content>, RankingError> {
        self.call_catalog("listing", self.catalog.list_contents()).await
    }

    /// Records that the user watched `content_id`. Idempotent.
    ///
    /// Returns the user's `WatchedItem`, which is the pre-existing one when the
    /// content had already been watched.
    pub async fn mark_watched(
        &self,
        user_id: UserId,
        content_id: ContentId,
        watched_at: DateTime<Utc>,
    ) -> Result<WatchedItem, RankingError> {
        self.ensure_content_exists(user_id, content_id).await?;

        let ledger = self.ledger(user_id);
        let mut rankings = ledger.write();

        if rankings.scores.initialize(content_id, watched_at) {
            tracing::info!(user_id = %user_id, content_id = %content_id, "Marked content watched");
        } else {
            tracing::debug!(user_id = %user_id, content_id = %content_id, "Content already watched");
        }

        rankings
            .scores
            .item(content_id)
            .cloned()
            .ok_or(RankingError::NotFound {
                user_id,
                content_id,
            })
    }

    /// Comparison partners for a watched item
    pub fn get_comparison_candidates(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<Vec<ContentId>, RankingError> {
        let not_watched = RankingError::NotWatched {
            user_id,
            content_id,
        };
        let ledger = self.existing_ledger(user_id).ok_or(not_watched.clone())?;
        let rankings = ledger.read();

        if !rankings.scores.contains(content_id) {
            return Err(not_watched);
        }

        let candidates = self.selector.select_candidates(&rankings.scores, content_id);
        tracing::debug!(
            user_id = %user_id,
            content_id = %content_id,
            candidate_count = candidates.len(),
            "Selected comparison candidates"
        );

        Ok(candidates)
    }

    /// Logs a judgment and applies it to both scores as one unit
    pub fn submit_comparison(
        &self,
        user_id: UserId,
        content_id_a: ContentId,
        content_id_b: ContentId,
        winner: Winner,
    ) -> Result<Comparison, RankingError> {
        let judgment = NewComparison {
            user_id,
            content_id_a,
            content_id_b,
            winner,
        };

        if content_id_a == content_id_b {
            return Err(RankingError::SelfComparison(content_id_a));
        }

        let ledger = self
            .existing_ledger(user_id)
            .ok_or(RankingError::InvalidComparison {
                user_id,
                content_id: content_id_a,
            })?;
        let mut guard = ledger.write();
        let rankings = &mut *guard;

        let comparison = rankings.log.append(judgment, &rankings.scores)?.clone();

        let (delta_a, delta_b) = self.rule.deltas(winner);
        let new_a = rankings.scores.apply_delta(content_id_a, delta_a)?;
        let new_b = rankings.scores.apply_delta(content_id_b, delta_b)?;

        tracing::info!(
            user_id = %user_id,
            comparison_id = comparison.id,
            content_id_a = %content_id_a,
            content_id_b = %content_id_b,
            winner = ?winner,
            score_a = new_a,
            score_b = new_b,
            "Applied comparison"
        );

        Ok(comparison)
    }

    /// The user's ranking, best first. Empty for users with no watched items.
    pub fn get_ranking(&self, user_id: UserId) -> RankingSnapshot {
        self.existing_ledger(user_id)
            .map(|ledger| ledger.read().scores.snapshot())
            .unwrap_or_default()
    }

    /// Watched items, most recently watched first
    pub fn watched(&self, user_id: UserId) -> Vec<WatchedItem> {
        let Some(ledger) = self.existing_ledger(user_id) else {
            return Vec::new();
        };

        let mut items: Vec<WatchedItem> = ledger.read().scores.items().cloned().collect();
        items.sort_by(|a, b| {
            b.watched_at
                .cmp(&a.watched_at)
                .then_with(|| a.content_id.cmp(&b.content_id))
        });
        items
    }

    /// Every comparison involving a watched item, in submission order
    pub fn history(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<Vec<Comparison>, RankingError> {
        let not_watched = RankingError::NotWatched {
            user_id,
            content_id,
        };
        let ledger = self.existing_ledger(user_id).ok_or(not_watched.clone())?;
        let rankings = ledger.read();

        if !rankings.scores.contains(content_id) {
            return Err(not_watched);
        }

        Ok(rankings.log.history(content_id).cloned().collect())
    }

    /// The user's full comparison log in submission order
    pub fn comparisons(&self, user_id: UserId) -> Vec<Comparison> {
        self.existing_ledger(user_id)
            .map(|ledger| ledger.read().log.entries().to_vec())
            .unwrap_or_default()
    }

    /// Compares the score cache with a replay of the log without changing anything
    pub fn verify(&self, user_id: UserId) -> ReplayReport {
        let Some(ledger) = self.existing_ledger(user_id) else {
            return ReplayReport {
                comparisons: 0,
                mismatched: Vec::new(),
            };
        };
        let rankings = ledger.read();
        let replayed = self.rule.replay(rankings.log.entries());

        let mut mismatched: Vec<ContentId> = rankings
            .scores
            .items()
            .filter(|item| {
                let expected = replayed
                    .get(&item.content_id)
                    .copied()
                    .unwrap_or((WatchedItem::BASELINE_SCORE, 0));
                expected != (item.score, item.comparison_count)
            })
            .map(|item| item.content_id)
            .collect();
        mismatched.sort();

        ReplayReport {
            comparisons: rankings.log.len(),
            mismatched,
        }
    }

    /// Recomputes the user's score cache by replaying their comparison log
    pub fn rebuild(&self, user_id: UserId) -> Result<ReplayReport, RankingError> {
        let Some(ledger) = self.existing_ledger(user_id) else {
            return Ok(ReplayReport {
                comparisons: 0,
                mismatched: Vec::new(),
            });
        };
        let mut guard = ledger.write();
        let rankings = &mut *guard;
        let replayed = self.rule.replay(rankings.log.entries());

        let content_ids: Vec<ContentId> = rankings.scores.items().map(|i| i.content_id).collect();
        let mut mismatched = Vec::new();

        for content_id in content_ids {
            let (score, count) = replayed
                .get(&content_id)
                .copied()
                .unwrap_or((WatchedItem::BASELINE_SCORE, 0));

            if let Some(item) = rankings.scores.item(content_id) {
                if (item.score, item.comparison_count) != (score, count) {
                    mismatched.push(content_id);
                }
            }
            rankings.scores.restore(content_id, score, count)?;
        }
        mismatched.sort();

        tracing::info!(
            user_id = %user_id,
            comparisons = rankings.log.len(),
            repaired = mismatched.len(),
            "Rebuilt score cache from comparison log"
        );

        Ok(ReplayReport {
            comparisons: rankings.log.len(),
            mismatched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use crate::services::catalog::{InMemoryCatalog, MockContentCatalog};

    const USER: UserId = UserId(1);

    fn catalog_with(ids: &[u64]) -> Arc<dyn ContentCatalog> {
        Arc::new(InMemoryCatalog::with_contents(ids.iter().map(|id| {
            Content::new(ContentId(*id), format!("Title {}", id), ContentType::Movie)
        })))
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::minutes(minutes)
    }

    async fn service_with_watched(ids: &[u64]) -> RankingService {
        let service = RankingService::new(catalog_with(&[1, 2, 3, 4, 5, 6]));
        for (minute, id) in ids.iter().enumerate() {
            service
                .mark_watched(USER, ContentId(*id), at(minute as i64))
                .await
                .unwrap();
        }
        service
    }

    fn score_of(service: &RankingService, content_id: u64) -> f64 {
        service
            .get_ranking(USER)
            .iter()
            .find(|e| e.content_id == ContentId(content_id))
            .map(|e| e.score)
            .unwrap()
    }

    #[tokio::test]
    async fn test_scenario() {
        let service = service_with_watched(&[1, 2, 3, 4]).await;

        assert_eq!(
            service.get_comparison_candidates(USER, ContentId(4)).unwrap(),
            vec![ContentId(3), ContentId(2), ContentId(1)]
        );

        service
            .submit_comparison(USER, ContentId(4), ContentId(1), Winner::A)
            .unwrap();
        assert_eq!(score_of(&service, 4), 10.0);
        assert_eq!(score_of(&service, 1), -5.0);

        service
            .submit_comparison(USER, ContentId(2), ContentId(4), Winner::A)
            .unwrap();
        assert_eq!(score_of(&service, 4), 5.0);
        assert_eq!(score_of(&service, 2), 10.0);

        let order: Vec<ContentId> = service.get_ranking(USER).iter().map(|e| e.content_id).collect();
        assert_eq!(order, vec![ContentId(2), ContentId(4), ContentId(3), ContentId(1)]);
    }

    #[tokio::test]
    async fn test_mark_watched_is_idempotent() {
        let service = service_with_watched(&[1, 2]).await;
        service
            .submit_comparison(USER, ContentId(1), ContentId(2), Winner::A)
            .unwrap();

        let item = service.mark_watched(USER, ContentId(1), at(100)).await.unwrap();

        assert_eq!(item.score, 10.0);
        assert_eq!(item.comparison_count, 1);
        assert_eq!(item.watched_at, at(0));
    }

    #[tokio::test]
    async fn test_mark_watched_unknown_content() {
        let service = RankingService::new(catalog_with(&[1]));
        let err = service.mark_watched(USER, ContentId(9), at(0)).await.unwrap_err();

        assert!(matches!(err, RankingError::NotFound { .. }));
        assert!(service.get_ranking(USER).is_empty());
    }

    #[tokio::test]
    async fn test_mark_watched_catalog_failure_is_unavailable() {
        let mut catalog = MockContentCatalog::new();
        catalog
            .expect_content_exists()
            .returning(|_| Err(CatalogError::Status(502)));
        catalog.expect_name().return_const("mock");

        let service = RankingService::new(Arc::new(catalog));
        let err = service.mark_watched(USER, ContentId(1), at(0)).await.unwrap_err();

        assert!(matches!(err, RankingError::Unavailable(_)));
        assert!(service.get_ranking(USER).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_watched_catalog_timeout_is_unavailable() {
        struct SlowCatalog;

        #[async_trait::async_trait]
        impl ContentCatalog for SlowCatalog {
            async fn get_content(
                &self,
                _content_id: ContentId,
            ) -> Result<Option<Content>, CatalogError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(None)
            }

            async fn list_contents(&self) -> Result<Vec<Content>, CatalogError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Vec::new())
            }

            fn name(&self) -> &'static str {
                "slow"
            }
        }

        let service = RankingService::new(Arc::new(SlowCatalog))
            .with_catalog_timeout(Duration::from_millis(50));
        let err = service.mark_watched(USER, ContentId(1), at(0)).await.unwrap_err();
        assert!(matches!(err, RankingError::Unavailable(_)));

        // Direct lookups share the same bound
        let err = service.content(ContentId(1)).await.unwrap_err();
        assert!(matches!(err, RankingError::Unavailable(_)));
        let err = service.catalog_contents().await.unwrap_err();
        assert!(matches!(err, RankingError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_catalog_passthrough() {
        let service = RankingService::new(catalog_with(&[2, 1]));

        let content = service.content(ContentId(2)).await.unwrap().unwrap();
        assert_eq!(content.title, "Title 2");
        assert!(service.content(ContentId(9)).await.unwrap().is_none());

        let ids: Vec<ContentId> = service
            .catalog_contents()
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![ContentId(1), ContentId(2)]);
    }

    #[tokio::test]
    async fn test_candidates_require_watched() {
        let service = service_with_watched(&[1, 2]).await;

        assert!(matches!(
            service.get_comparison_candidates(USER, ContentId(3)),
            Err(RankingError::NotWatched { .. })
        ));
        assert!(matches!(
            service.get_comparison_candidates(UserId(99), ContentId(1)),
            Err(RankingError::NotWatched { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_comparison_leaves_state_untouched() {
        let service = service_with_watched(&[1, 2]).await;

        let err = service
            .submit_comparison(USER, ContentId(1), ContentId(5), Winner::A)
            .unwrap_err();
        assert_eq!(
            err,
            RankingError::InvalidComparison {
                user_id: USER,
                content_id: ContentId(5),
            }
        );

        let err = service
            .submit_comparison(USER, ContentId(2), ContentId(2), Winner::B)
            .unwrap_err();
        assert_eq!(err, RankingError::SelfComparison(ContentId(2)));

        assert!(service.comparisons(USER).is_empty());
        assert!(service.get_ranking(USER).iter().all(|e| e.score == 0.0 && e.comparison_count == 0));
    }

    #[tokio::test]
    async fn test_comparison_for_unknown_user() {
        let service = service_with_watched(&[1, 2]).await;

        assert!(matches!(
            service.submit_comparison(UserId(2), ContentId(1), ContentId(2), Winner::A),
            Err(RankingError::InvalidComparison { .. })
        ));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let service = service_with_watched(&[1, 2]).await;
        service.mark_watched(UserId(2), ContentId(1), at(0)).await.unwrap();
        service.mark_watched(UserId(2), ContentId(2), at(1)).await.unwrap();

        service
            .submit_comparison(USER, ContentId(1), ContentId(2), Winner::A)
            .unwrap();

        assert!(service
            .get_ranking(UserId(2))
            .iter()
            .all(|e| e.score == 0.0));
    }

    #[tokio::test]
    async fn test_history_and_watched() {
        let service = service_with_watched(&[1, 2, 3]).await;
        service
            .submit_comparison(USER, ContentId(1), ContentId(2), Winner::A)
            .unwrap();
        service
            .submit_comparison(USER, ContentId(2), ContentId(3), Winner::B)
            .unwrap();

        let history = service.history(USER, ContentId(2)).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].id < history[1].id);
        assert!(service.history(USER, ContentId(1)).unwrap().len() == 1);
        assert!(matches!(
            service.history(USER, ContentId(6)),
            Err(RankingError::NotWatched { .. })
        ));

        let watched: Vec<ContentId> = service.watched(USER).iter().map(|i| i.content_id).collect();
        assert_eq!(watched, vec![ContentId(3), ContentId(2), ContentId(1)]);
    }

    #[tokio::test]
    async fn test_verify_and_rebuild() {
        let service = service_with_watched(&[1, 2, 3]).await;
        service
            .submit_comparison(USER, ContentId(1), ContentId(2), Winner::A)
            .unwrap();
        service
            .submit_comparison(USER, ContentId(3), ContentId(1), Winner::A)
            .unwrap();

        assert!(service.verify(USER).is_consistent());

        // Corrupt the cache directly, then repair it from the log
        if let Some(ledger) = service.existing_ledger(USER) {
            ledger.write().scores.restore(ContentId(2), 99.0, 7).unwrap();
        }
        let report = service.verify(USER);
        assert_eq!(report.mismatched, vec![ContentId(2)]);

        let repaired = service.rebuild(USER).unwrap();
        assert_eq!(repaired.comparisons, 2);
        assert_eq!(repaired.mismatched, vec![ContentId(2)]);
        assert!(service.verify(USER).is_consistent());
        assert_eq!(score_of(&service, 2), -5.0);
    }

    #[tokio::test]
    async fn test_custom_rule() {
        let service = RankingService::new(catalog_with(&[1, 2]))
            .with_rule(UpdateRule::new(3.0, 1.0))
            .with_max_candidates(1);
        service.mark_watched(USER, ContentId(1), at(0)).await.unwrap();
        service.mark_watched(USER, ContentId(2), at(1)).await.unwrap();

        service
            .submit_comparison(USER, ContentId(1), ContentId(2), Winner::B)
            .unwrap();

        assert_eq!(score_of(&service, 1), -1.0);
        assert_eq!(score_of(&service, 2), 3.0);
        assert_eq!(
            service.get_comparison_candidates(USER, ContentId(1)).unwrap(),
            vec![ContentId(2)]
        );
    }
}
