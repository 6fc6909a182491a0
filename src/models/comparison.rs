use serde::{Deserialize, Serialize};

use super::RewardEstimate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    You,
    Fren,
}

/// Head-to-head of two handles on the same project and FDV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub you: RewardEstimate,
    pub fren: RewardEstimate,
    pub leader: Side,
    /// Fraction of the combined worth held by `you`, in [0, 1].
    pub you_share: f64,
}

impl Comparison {
    pub fn leader_handle(&self) -> &str {
        match self.leader {
            Side::You => &self.you.handle,
            Side::Fren => &self.fren.handle,
        }
    }

    pub fn worth_gap(&self) -> f64 {
        (self.you.valuation.worth_usd - self.fren.valuation.worth_usd).abs()
    }
}
