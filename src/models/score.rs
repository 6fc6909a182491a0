use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Outcome of scoring one user against one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub weighted_score: f64,
    /// `true` when the mindshare path produced the score, `false` for the
    /// penalised rank fallback (or no score at all).
    pub used_mindshare: bool,
    pub eligible: bool,
    pub best_rank: Option<u32>,
    pub tokens_awarded: f64,
}

impl ScoreResult {
    pub fn empty() -> Self {
        Self {
            weighted_score: 0.0,
            used_mindshare: false,
            eligible: false,
            best_rank: None,
            tokens_awarded: 0.0,
        }
    }
}

/// Token price and reward worth under a simulated fully diluted valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub fdv: f64,
    pub token_price: f64,
    pub worth_usd: f64,
}

/// Everything the dashboard shows for one handle on one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardEstimate {
    pub handle: String,
    pub project: String,
    pub ticker: String,
    pub total_supply: f64,
    pub rows_considered: usize,
    pub score: ScoreResult,
    pub valuation: Valuation,
    pub tagline: String,
    pub fetched_at: DateTime<Utc>,
}
