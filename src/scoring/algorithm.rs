use crate::models::{EligibilityRule, NormalizedRow, ProjectConfig, ScoreResult};

/// Map a rank onto [0, 1]: 1.0 for #1, decaying linearly to `1/ceiling`
/// at the ceiling and 0 beyond it.
pub fn rank_unit(rank: f64, ceiling: u32) -> f64 {
    let ceiling = ceiling as f64;
    if !rank.is_finite() || rank <= 0.0 || rank > ceiling {
        return 0.0;
    }
    (ceiling + 1.0 - rank) / ceiling
}

/// Running sums over one project's rows.
#[derive(Debug, Default)]
struct Accumulator {
    mindshare_score: f64,
    rank_score: f64,
    saw_mindshare: bool,
    best_rank: Option<f64>,
    ranked_within_ceiling: bool,
}

pub struct ScoringAlgorithm {
    project: ProjectConfig,
}

impl ScoringAlgorithm {
    pub fn new(project: ProjectConfig) -> Self {
        Self { project }
    }

    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    pub fn calculate_score(&self, rows: &[NormalizedRow]) -> ScoreResult {
        if rows.is_empty() {
            return ScoreResult::empty();
        }

        let acc = self.accumulate(rows);
        let (weighted_score, used_mindshare) = self.select_score(&acc);
        let eligible = self.is_eligible(&acc, weighted_score);

        ScoreResult {
            weighted_score,
            used_mindshare,
            eligible,
            // Rounded up so a fractional rank past the ceiling never reports inside it.
            best_rank: acc.best_rank.map(|r| r.ceil() as u32),
            tokens_awarded: self.allocate(eligible, weighted_score),
        }
    }

    fn accumulate(&self, rows: &[NormalizedRow]) -> Accumulator {
        let ceiling = self.project.eligibility_rank_ceiling;
        let mut acc = Accumulator::default();

        for row in rows {
            let weight = self.project.time_weight(&row.duration) * self.project.tier_weight(&row.tier);

            if let Some(mindshare) = row.mindshare {
                acc.saw_mindshare = true;
                acc.mindshare_score += mindshare.max(0.0) * weight;
            }

            if let Some(rank) = row.rank {
                acc.rank_score += rank_unit(rank, ceiling) * weight;
                if rank <= ceiling as f64 {
                    acc.ranked_within_ceiling = true;
                }
                acc.best_rank = Some(acc.best_rank.map_or(rank, |best| best.min(rank)));
            }
        }

        acc
    }

    /// Mindshare is authoritative whenever it produced a positive score; the
    /// rank score is only a penalised stand-in.
    fn select_score(&self, acc: &Accumulator) -> (f64, bool) {
        if acc.saw_mindshare && acc.mindshare_score > 0.0 {
            return (acc.mindshare_score, true);
        }

        match self.project.rank_fallback_penalty {
            Some(penalty) => (acc.rank_score * penalty, false),
            None => (acc.mindshare_score, false),
        }
    }

    fn is_eligible(&self, acc: &Accumulator, score: f64) -> bool {
        let ceiling = self.project.eligibility_rank_ceiling as f64;
        let on_leaderboard = match self.project.eligibility {
            EligibilityRule::BestRank => acc.best_rank.is_some_and(|r| r <= ceiling),
            EligibilityRule::AnyRankedRow => acc.ranked_within_ceiling,
        };
        on_leaderboard && score > 0.0
    }

    fn allocate(&self, eligible: bool, score: f64) -> f64 {
        let denominator = self.project.global_mindshare_denominator;
        if !eligible || denominator <= 0.0 {
            return 0.0;
        }
        (self.project.reward_pool * score / denominator).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::projects::{billions, irys, portal_to_btc};

    fn row(duration: &str, tier: &str, mindshare: Option<f64>, rank: Option<f64>) -> NormalizedRow {
        NormalizedRow {
            topic_id: "BILLIONS".to_string(),
            duration: duration.to_string(),
            tier: tier.to_string(),
            mindshare,
            rank,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rank_unit_bounds() {
        assert!(approx(rank_unit(1.0, 1000), 1.0));
        assert!(approx(rank_unit(1000.0, 1000), 0.001));
        assert_eq!(rank_unit(1001.0, 1000), 0.0);
        assert_eq!(rank_unit(0.0, 1000), 0.0);
        assert_eq!(rank_unit(f64::INFINITY, 1000), 0.0);
    }

    #[test]
    fn test_mindshare_path() {
        let algo = ScoringAlgorithm::new(billions());
        let score = algo.calculate_score(&[row("3M", "tier1", Some(100.0), Some(5.0))]);

        assert!(score.used_mindshare);
        assert!(approx(score.weighted_score, 100.0));
        assert!(score.eligible);
        assert_eq!(score.best_rank, Some(5));
        assert!(approx(score.tokens_awarded, 10_000_000.0 * 100.0 / 450.0));
    }

    #[test]
    fn test_rank_fallback_path() {
        let algo = ScoringAlgorithm::new(billions());
        let score = algo.calculate_score(&[row("30D", "tier2", None, Some(50.0))]);

        let expected = 0.951 * 0.8 * 0.7 * 0.35;
        assert!(!score.used_mindshare);
        assert!(approx(score.weighted_score, expected));
        assert!(score.eligible);
    }

    #[test]
    fn test_zero_mindshare_falls_back_to_rank() {
        let algo = ScoringAlgorithm::new(billions());
        let score = algo.calculate_score(&[row("3M", "tier1", Some(0.0), Some(1.0))]);

        assert!(!score.used_mindshare);
        assert!(approx(score.weighted_score, 0.35));
    }

    #[test]
    fn test_negative_mindshare_clamped() {
        let algo = ScoringAlgorithm::new(billions());
        let score = algo.calculate_score(&[
            row("3M", "tier1", Some(-50.0), Some(3.0)),
            row("6M", "tier1", Some(10.0), Some(3.0)),
        ]);

        assert!(score.used_mindshare);
        assert!(approx(score.weighted_score, 5.0));
    }

    #[test]
    fn test_unranked_user_is_ineligible_and_gets_nothing() {
        let algo = ScoringAlgorithm::new(billions());
        let score = algo.calculate_score(&[row("3M", "tier1", Some(40.0), None)]);

        assert!(score.weighted_score > 0.0);
        assert!(!score.eligible);
        assert_eq!(score.best_rank, None);
        assert_eq!(score.tokens_awarded, 0.0);
    }

    #[test]
    fn test_fractional_rank_past_ceiling_reported_outside_it() {
        let algo = ScoringAlgorithm::new(billions());
        let score = algo.calculate_score(&[row("3M", "tier1", Some(10.0), Some(1000.5))]);

        assert!(!score.eligible);
        assert_eq!(score.best_rank, Some(1001));
        assert_eq!(score.tokens_awarded, 0.0);

        let score = algo.calculate_score(&[row("3M", "tier1", Some(10.0), Some(999.5))]);
        assert!(score.eligible);
        assert_eq!(score.best_rank, Some(1000));
    }

    #[test]
    fn test_rank_beyond_ceiling_is_ineligible() {
        let algo = ScoringAlgorithm::new(billions());
        let score = algo.calculate_score(&[row("3M", "tier1", Some(40.0), Some(1500.0))]);

        assert!(!score.eligible);
        assert_eq!(score.best_rank, Some(1500));
        assert_eq!(score.tokens_awarded, 0.0);
    }

    #[test]
    fn test_unknown_tier_contributes_nothing() {
        let algo = ScoringAlgorithm::new(billions());
        let score = algo.calculate_score(&[row("3M", "specific", Some(40.0), Some(2.0))]);

        assert_eq!(score.weighted_score, 0.0);
        assert!(!score.eligible);
    }

    #[test]
    fn test_project_without_fallback_ignores_rank() {
        let algo = ScoringAlgorithm::new(irys());
        let score = algo.calculate_score(&[row("3M", "specific", None, Some(1.0))]);

        assert_eq!(score.weighted_score, 0.0);
        assert!(!score.used_mindshare);
        assert!(!score.eligible);
    }

    #[test]
    fn test_eligibility_rules_agree_on_mixed_ranks() {
        let rows = [
            row("3M", "tier1", None, Some(2400.0)),
            row("30D", "tier1", None, Some(640.0)),
            row("6M", "tier2", None, None),
        ];

        let best_rank = ScoringAlgorithm::new(billions()).calculate_score(&rows);
        let mut any_row_project = billions();
        any_row_project.eligibility = EligibilityRule::AnyRankedRow;
        let any_row = ScoringAlgorithm::new(any_row_project).calculate_score(&rows);

        assert!(best_rank.eligible);
        assert_eq!(best_rank, any_row);
        assert_eq!(best_rank.best_rank, Some(640));
    }

    #[test]
    fn test_portal_uses_any_ranked_row() {
        let mut rows = vec![row("3M", "tier1", Some(2.0), Some(999.0))];
        rows[0].topic_id = "PORTALPORTAL".to_string();

        let score = ScoringAlgorithm::new(portal_to_btc()).calculate_score(&rows);
        assert!(score.eligible);
        assert!(approx(score.tokens_awarded, 41_950_000.0 * 2.0 / 400.0));
    }

    #[test]
    fn test_zero_denominator_awards_nothing() {
        let mut project = billions();
        project.global_mindshare_denominator = 0.0;
        let score = ScoringAlgorithm::new(project).calculate_score(&[row("3M", "tier1", Some(10.0), Some(1.0))]);

        assert!(score.eligible);
        assert_eq!(score.tokens_awarded, 0.0);
    }

    #[test]
    fn test_mindshare_monotonicity() {
        let algo = ScoringAlgorithm::new(billions());
        let mut previous = 0.0;
        for mindshare in [0.5, 1.0, 2.5, 10.0, 80.0] {
            let score = algo.calculate_score(&[
                row("3M", "tier1", Some(mindshare), Some(10.0)),
                row("30D", "tier2", Some(3.0), Some(20.0)),
            ]);
            assert!(score.used_mindshare);
            assert!(score.weighted_score >= previous);
            previous = score.weighted_score;
        }
    }

    #[test]
    fn test_empty_rows() {
        let score = ScoringAlgorithm::new(billions()).calculate_score(&[]);
        assert_eq!(score, ScoreResult::empty());
    }
}
