use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_RANK_CEILING: u32 = 1000;

/// How a project decides whether a user made it onto its leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityRule {
    /// The best (lowest) finite rank must be within the ceiling.
    BestRank,
    /// Any included row must carry a rank within the ceiling.
    AnyRankedRow,
}

impl Default for EligibilityRule {
    fn default() -> Self {
        EligibilityRule::BestRank
    }
}

/// Constant table describing one project's reward campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Short identifier used on the command line and in URLs.
    pub slug: String,
    pub name: String,
    pub ticker: String,
    /// Topic identifier the upstream leaderboard uses for this project.
    pub topic_id: String,
    pub time_weights: BTreeMap<String, f64>,
    pub tier_weights: BTreeMap<String, f64>,
    pub included_durations: BTreeSet<String>,
    pub total_supply: f64,
    pub reward_pool: f64,
    pub global_mindshare_denominator: f64,
    /// Dampening applied to the rank-based score. `None` disables the
    /// rank fallback so that missing mindshare simply counts as zero.
    #[serde(default)]
    pub rank_fallback_penalty: Option<f64>,
    #[serde(default = "default_rank_ceiling")]
    pub eligibility_rank_ceiling: u32,
    #[serde(default)]
    pub eligibility: EligibilityRule,
}

fn default_rank_ceiling() -> u32 {
    DEFAULT_RANK_CEILING
}

impl ProjectConfig {
    pub fn time_weight(&self, duration: &str) -> f64 {
        self.time_weights.get(duration).copied().unwrap_or(0.0)
    }

    pub fn tier_weight(&self, tier: &str) -> f64 {
        self.tier_weights.get(tier).copied().unwrap_or(0.0)
    }

    pub fn includes_duration(&self, duration: &str) -> bool {
        self.included_durations.contains(duration)
    }

    /// Rewrite keys into canonical casing: topic and durations upper-case,
    /// tiers lower-case. Config sources may fold key case.
    pub fn canonicalize(&mut self) {
        self.slug = self.slug.trim().to_lowercase();
        self.topic_id = self.topic_id.trim().to_uppercase();
        self.time_weights = std::mem::take(&mut self.time_weights)
            .into_iter()
            .map(|(k, v)| (k.trim().to_uppercase(), v))
            .collect();
        self.tier_weights = std::mem::take(&mut self.tier_weights)
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        self.included_durations = std::mem::take(&mut self.included_durations)
            .into_iter()
            .map(|d| d.trim().to_uppercase())
            .collect();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.slug.is_empty() {
            return Err("Project slug must not be empty".to_string());
        }
        if self.topic_id.is_empty() {
            return Err(format!("Project {} has an empty topic id", self.slug));
        }
        if self.included_durations.is_empty() {
            return Err(format!("Project {} includes no durations", self.slug));
        }

        for (duration, weight) in &self.time_weights {
            if !(*weight > 0.0 && *weight <= 1.0) {
                return Err(format!(
                    "Project {}: time weight for {} must be in (0, 1], got {}",
                    self.slug, duration, weight
                ));
            }
        }
        for (tier, weight) in &self.tier_weights {
            if !(*weight > 0.0 && *weight <= 1.0) {
                return Err(format!(
                    "Project {}: tier weight for {} must be in (0, 1], got {}",
                    self.slug, tier, weight
                ));
            }
        }

        if let Some(penalty) = self.rank_fallback_penalty {
            if !(penalty > 0.0 && penalty < 1.0) {
                return Err(format!(
                    "Project {}: rank fallback penalty must be in (0, 1), got {}",
                    self.slug, penalty
                ));
            }
        }

        if !(self.total_supply > 0.0 && self.total_supply.is_finite()) {
            return Err(format!("Project {}: total supply must be positive", self.slug));
        }
        if !(self.reward_pool >= 0.0 && self.reward_pool.is_finite()) {
            return Err(format!("Project {}: reward pool must be non-negative", self.slug));
        }
        if !(self.global_mindshare_denominator >= 0.0 && self.global_mindshare_denominator.is_finite()) {
            return Err(format!(
                "Project {}: global mindshare denominator must be non-negative",
                self.slug
            ));
        }
        if self.eligibility_rank_ceiling == 0 {
            return Err(format!("Project {}: rank ceiling must be positive", self.slug));
        }

        Ok(())
    }
}
