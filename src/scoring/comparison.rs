use crate::models::{Comparison, RewardEstimate, Side};

/// Pick the leader by USD worth. Equal worth goes to `you`, so repeated runs
/// over the same inputs always agree.
pub fn leader(you: &RewardEstimate, fren: &RewardEstimate) -> Side {
    if you.valuation.worth_usd >= fren.valuation.worth_usd {
        Side::You
    } else {
        Side::Fren
    }
}

/// Share of the combined worth held by `you`; an even split when neither
/// side is worth anything or the total overflows.
pub fn you_share(you_worth: f64, fren_worth: f64) -> f64 {
    let a = you_worth.max(0.0);
    let b = fren_worth.max(0.0);
    let total = a + b;
    if total > 0.0 && total.is_finite() {
        a / total
    } else {
        0.5
    }
}

pub fn compare(you: RewardEstimate, fren: RewardEstimate) -> Comparison {
    let leader = leader(&you, &fren);
    let you_share = you_share(you.valuation.worth_usd, fren.valuation.worth_usd);

    Comparison {
        you,
        fren,
        leader,
        you_share,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScoreResult, Valuation};
    use chrono::Utc;

    fn estimate(handle: &str, worth_usd: f64) -> RewardEstimate {
        RewardEstimate {
            handle: handle.to_string(),
            project: "billions".to_string(),
            ticker: "BLNS".to_string(),
            total_supply: 1e9,
            rows_considered: 1,
            score: ScoreResult::empty(),
            valuation: Valuation {
                fdv: 1e9,
                token_price: 1.0,
                worth_usd,
            },
            tagline: String::new(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_higher_worth_leads() {
        let comparison = compare(estimate("alice", 10.0), estimate("bob", 30.0));
        assert_eq!(comparison.leader, Side::Fren);
        assert_eq!(comparison.leader_handle(), "bob");
        assert!((comparison.you_share - 0.25).abs() < 1e-12);
        assert_eq!(comparison.worth_gap(), 20.0);
    }

    #[test]
    fn test_tie_goes_to_you_every_time() {
        for _ in 0..5 {
            let comparison = compare(estimate("alice", 42.0), estimate("bob", 42.0));
            assert_eq!(comparison.leader, Side::You);
        }
        assert_eq!(compare(estimate("bob", 42.0), estimate("alice", 42.0)).leader_handle(), "bob");
    }

    #[test]
    fn test_even_split_when_both_zero() {
        assert_eq!(you_share(0.0, 0.0), 0.5);
        assert_eq!(you_share(5.0, 0.0), 1.0);
    }

    #[test]
    fn test_overflowing_worths_split_evenly() {
        assert_eq!(you_share(f64::INFINITY, f64::INFINITY), 0.5);
        assert_eq!(you_share(f64::MAX, f64::MAX), 0.5);

        let comparison = compare(estimate("alice", f64::INFINITY), estimate("bob", f64::INFINITY));
        assert_eq!(comparison.leader, Side::You);
        assert!((0.0..=1.0).contains(&comparison.you_share));
    }
}
