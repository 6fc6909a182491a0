use crate::{
    config::ProjectRegistry,
    models::{
        Comparison, LeaderboardRow, ProjectConfig, Result, RewardEstimate, UserOverview,
        Valuation, YapScoreError,
    },
    scoring::{comparison, normalizer, valuation, ScoringAlgorithm},
    upstream::LeaderboardSource,
    utils::sanitize_handle,
};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// Fetches leaderboard data for handles and turns it into reward estimates.
pub struct ScoreCalculator {
    source: Arc<dyn LeaderboardSource>,
    registry: ProjectRegistry,
}

impl ScoreCalculator {
    pub fn new(source: Arc<dyn LeaderboardSource>, registry: ProjectRegistry) -> Self {
        Self { source, registry }
    }

    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    /// Score already-fetched rows. No I/O.
    pub fn estimate_rows(
        project: &ProjectConfig,
        handle: &str,
        rows: &[LeaderboardRow],
        fdv: f64,
    ) -> RewardEstimate {
        let normalized = normalizer::normalize(rows, project);
        let score = ScoringAlgorithm::new(project.clone()).calculate_score(&normalized);
        let valuation = Valuation::of(&score, project.total_supply, fdv);

        RewardEstimate {
            handle: handle.to_string(),
            project: project.slug.clone(),
            ticker: project.ticker.clone(),
            total_supply: project.total_supply,
            rows_considered: normalized.len(),
            score,
            valuation,
            tagline: valuation::tagline(valuation.worth_usd).to_string(),
            fetched_at: Utc::now(),
        }
    }

    pub async fn estimate(&self, project: &str, handle: &str, fdv: f64) -> Result<RewardEstimate> {
        let project = self.registry.get(project)?;
        let handle = sanitize_handle(handle)?;
        let fdv = check_fdv(fdv)?;

        info!("Estimating {} rewards for @{}", project.slug, handle);
        let rows = self.source.leaderboard(&handle).await?;
        let estimate = Self::estimate_rows(project, &handle, &rows, fdv);

        info!(
            "@{} on {}: score {:.4} ({}), eligible {}, {:.2} tokens",
            handle,
            project.slug,
            estimate.score.weighted_score,
            if estimate.score.used_mindshare { "mindshare" } else { "rank fallback" },
            estimate.score.eligible,
            estimate.score.tokens_awarded,
        );

        Ok(estimate)
    }

    /// Score two handles concurrently under the same project and FDV.
    /// Either leg failing fails the whole comparison.
    pub async fn compare(&self, project: &str, you: &str, fren: &str, fdv: f64) -> Result<Comparison> {
        let (you, fren) = tokio::try_join!(
            self.estimate(project, you, fdv),
            self.estimate(project, fren, fdv),
        )?;

        let comparison = comparison::compare(you, fren);
        info!("Comparison on {}: @{} leads", project, comparison.leader_handle());
        Ok(comparison)
    }

    pub async fn estimate_batch(
        &self,
        project: &str,
        handles: &[String],
        fdv: f64,
    ) -> Vec<(String, Result<RewardEstimate>)> {
        info!("Estimating {} handles on {}", handles.len(), project);

        let results = join_all(handles.iter().map(|h| self.estimate(project, h, fdv))).await;

        handles
            .iter()
            .cloned()
            .zip(results)
            .inspect(|(handle, result)| {
                if let Err(e) = result {
                    warn!("Estimate for {} failed: {}", handle, e);
                }
            })
            .collect()
    }

    pub async fn overview(&self, handle: &str) -> Result<UserOverview> {
        let handle = sanitize_handle(handle)?;
        let (status, yaps) = tokio::try_join!(
            self.source.user_status(&handle),
            self.source.yaps(&handle),
        )?;

        Ok(UserOverview { handle, status, yaps })
    }
}

pub fn check_fdv(fdv: f64) -> Result<f64> {
    if fdv.is_finite() && fdv >= 0.0 {
        Ok(fdv)
    } else {
        Err(YapScoreError::InvalidFdv(fdv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Side, UserStatus, YapsSummary};
    use crate::upstream::client::MockLeaderboardSource;

    fn rows_for(handle: &str) -> Vec<LeaderboardRow> {
        match handle {
            "alice" => vec![
                LeaderboardRow::new("BILLIONS", "3M", "tier1").with_mindshare(100.0).with_rank(5.0),
                LeaderboardRow::new("IRYS", "3M", "specific").with_mindshare(3.0).with_rank(90.0),
            ],
            "bob" => vec![LeaderboardRow::new("BILLIONS", "30D", "tier2").with_rank(50.0)],
            _ => Vec::new(),
        }
    }

    fn calculator(mock: MockLeaderboardSource) -> ScoreCalculator {
        ScoreCalculator::new(Arc::new(mock), ProjectRegistry::builtin())
    }

    #[tokio::test]
    async fn test_estimate_sanitizes_handle_and_scores() {
        let mut mock = MockLeaderboardSource::new();
        mock.expect_leaderboard()
            .withf(|handle| handle == "alice")
            .times(1)
            .returning(|h| Ok(rows_for(h)));

        let estimate = calculator(mock).estimate("billions", "@alice", 1e9).await.unwrap();

        assert_eq!(estimate.handle, "alice");
        assert_eq!(estimate.rows_considered, 1);
        assert!(estimate.score.eligible);
        assert!((estimate.valuation.worth_usd - 10_000_000.0 * 100.0 / 450.0).abs() < 1e-3);
        assert_eq!(estimate.tagline, "Time for a vacation");
    }

    #[tokio::test]
    async fn test_unknown_project_and_bad_fdv_fail_before_fetching() {
        let mut mock = MockLeaderboardSource::new();
        mock.expect_leaderboard().times(0);
        let calc = calculator(mock);

        assert!(matches!(
            calc.estimate("monad", "alice", 1e9).await,
            Err(YapScoreError::UnknownProject(_))
        ));
        assert!(matches!(
            calc.estimate("billions", "alice", -1.0).await,
            Err(YapScoreError::InvalidFdv(_))
        ));
        assert!(matches!(
            calc.estimate("billions", "@", 1e9).await,
            Err(YapScoreError::InvalidHandle(_))
        ));
    }

    #[tokio::test]
    async fn test_compare_picks_leader() {
        let mut mock = MockLeaderboardSource::new();
        mock.expect_leaderboard().times(2).returning(|h| Ok(rows_for(h)));

        let comparison = calculator(mock).compare("billions", "bob", "alice", 1e9).await.unwrap();

        assert_eq!(comparison.leader, Side::Fren);
        assert_eq!(comparison.leader_handle(), "alice");
        assert!(comparison.fren.score.used_mindshare);
        assert!(!comparison.you.score.used_mindshare);
        assert!(comparison.you_share < 0.5);
    }

    #[tokio::test]
    async fn test_compare_fails_if_either_leg_fails() {
        let mut mock = MockLeaderboardSource::new();
        mock.expect_leaderboard().returning(|h| {
            if h == "bob" {
                Err(YapScoreError::UpstreamStatus {
                    endpoint: "kaito/leaderboard-search".to_string(),
                    status: 503,
                })
            } else {
                Ok(rows_for(h))
            }
        });

        let result = calculator(mock).compare("billions", "alice", "bob", 1e9).await;
        assert!(matches!(result, Err(YapScoreError::UpstreamStatus { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_batch_reports_each_handle() {
        let mut mock = MockLeaderboardSource::new();
        mock.expect_leaderboard().returning(|h| Ok(rows_for(h)));

        let handles = vec!["alice".to_string(), "".to_string(), "carol".to_string()];
        let results = calculator(mock).estimate_batch("billions", &handles, 1e9).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].1.as_ref().unwrap().score.eligible);
        assert!(results[1].1.is_err());
        assert_eq!(results[2].1.as_ref().unwrap().rows_considered, 0);
    }

    #[tokio::test]
    async fn test_overview_joins_both_requests() {
        let mut mock = MockLeaderboardSource::new();
        mock.expect_user_status().returning(|_| {
            Ok(UserStatus {
                follower_count: 1200,
                smart_follower_count: 40,
                ..Default::default()
            })
        });
        mock.expect_yaps().returning(|_| {
            Ok(YapsSummary {
                yaps_all: 530.5,
                yaps_l24h: 2.0,
                ..Default::default()
            })
        });

        let overview = calculator(mock).overview("@alice").await.unwrap();
        assert_eq!(overview.handle, "alice");
        assert_eq!(overview.status.smart_follower_count, 40);
        assert_eq!(overview.yaps.yaps_all, 530.5);
    }

    #[test]
    fn test_revalue_keeps_tokens() {
        let rows = rows_for("alice");
        let mut estimate = ScoreCalculator::estimate_rows(&crate::config::projects::billions(), "alice", &rows, 1e9);
        let tokens = estimate.score.tokens_awarded;

        estimate.revalue(2e9);
        assert_eq!(estimate.score.tokens_awarded, tokens);
        assert_eq!(estimate.valuation.token_price, 2.0);

        estimate.revalue(0.0);
        assert_eq!(estimate.valuation.worth_usd, 0.0);
        assert_eq!(estimate.tagline, "We go again");
    }
}
