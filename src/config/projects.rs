use std::collections::{BTreeMap, BTreeSet};

use crate::models::{EligibilityRule, ProjectConfig, Result, YapScoreError, DEFAULT_RANK_CEILING};

const STANDARD_DURATIONS: [&str; 3] = ["3M", "30D", "6M"];

// 3M > 30D > 6M for every campaign tracked so far.
fn standard_time_weights() -> BTreeMap<String, f64> {
    weights(&[("3M", 1.0), ("30D", 0.8), ("6M", 0.5)])
}

fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn standard_durations() -> BTreeSet<String> {
    STANDARD_DURATIONS.iter().map(|d| d.to_string()).collect()
}

pub fn irys() -> ProjectConfig {
    ProjectConfig {
        slug: "irys".to_string(),
        name: "Irys".to_string(),
        ticker: "IRYS".to_string(),
        topic_id: "IRYS".to_string(),
        time_weights: standard_time_weights(),
        // Specific > Community > Creator
        tier_weights: weights(&[("specific", 1.0), ("tier2", 0.7), ("tier1", 0.5)]),
        included_durations: standard_durations(),
        total_supply: 1_000_000_000.0,
        reward_pool: 7_500_000.0,
        global_mindshare_denominator: 355.0,
        rank_fallback_penalty: None,
        eligibility_rank_ceiling: DEFAULT_RANK_CEILING,
        eligibility: EligibilityRule::BestRank,
    }
}

pub fn billions() -> ProjectConfig {
    ProjectConfig {
        slug: "billions".to_string(),
        name: "Billions".to_string(),
        ticker: "BLNS".to_string(),
        topic_id: "BILLIONS".to_string(),
        time_weights: standard_time_weights(),
        tier_weights: weights(&[("tier1", 1.0), ("tier2", 0.7)]),
        included_durations: standard_durations(),
        total_supply: 1_000_000_000.0,
        reward_pool: 10_000_000.0,
        global_mindshare_denominator: 450.0,
        rank_fallback_penalty: Some(0.35),
        eligibility_rank_ceiling: DEFAULT_RANK_CEILING,
        eligibility: EligibilityRule::BestRank,
    }
}

pub fn portal_to_btc() -> ProjectConfig {
    ProjectConfig {
        slug: "portaltobtc".to_string(),
        name: "Portal to BTC".to_string(),
        ticker: "PTB".to_string(),
        topic_id: "PORTALPORTAL".to_string(),
        time_weights: standard_time_weights(),
        tier_weights: weights(&[("tier1", 1.0), ("tier2", 0.7)]),
        included_durations: standard_durations(),
        total_supply: 8_390_000_000.0,
        // 0.5% of supply
        reward_pool: 41_950_000.0,
        global_mindshare_denominator: 400.0,
        rank_fallback_penalty: Some(0.35),
        eligibility_rank_ceiling: DEFAULT_RANK_CEILING,
        eligibility: EligibilityRule::AnyRankedRow,
    }
}

pub fn builtin_projects() -> Vec<ProjectConfig> {
    vec![irys(), billions(), portal_to_btc()]
}

/// Lookup table over the configured projects.
#[derive(Debug, Clone)]
pub struct ProjectRegistry {
    projects: Vec<ProjectConfig>,
}

impl ProjectRegistry {
    pub fn new(projects: Vec<ProjectConfig>) -> Self {
        Self { projects }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_projects())
    }

    /// Find a project by slug or upstream topic id, ignoring case.
    pub fn get(&self, key: &str) -> Result<&ProjectConfig> {
        let key = key.trim();
        self.projects
            .iter()
            .find(|p| p.slug.eq_ignore_ascii_case(key) || p.topic_id.eq_ignore_ascii_case(key))
            .ok_or_else(|| YapScoreError::UnknownProject(key.to_string()))
    }

    pub fn all(&self) -> &[ProjectConfig] {
        &self.projects
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.projects.iter().map(|p| p.slug.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_projects_validate() {
        for project in builtin_projects() {
            assert!(project.validate().is_ok(), "{} failed validation", project.slug);
        }
    }

    #[test]
    fn test_registry_lookup_by_slug_and_topic() {
        let registry = ProjectRegistry::builtin();
        assert_eq!(registry.get("billions").unwrap().topic_id, "BILLIONS");
        assert_eq!(registry.get("PORTALPORTAL").unwrap().slug, "portaltobtc");
        assert_eq!(registry.get(" Irys ").unwrap().ticker, "IRYS");
        assert!(matches!(
            registry.get("monad"),
            Err(YapScoreError::UnknownProject(_))
        ));
    }

    #[test]
    fn test_tier_orderings_are_per_project() {
        let irys = irys();
        let billions = billions();
        assert!(irys.tier_weight("tier1") < irys.tier_weight("tier2"));
        assert!(billions.tier_weight("tier1") > billions.tier_weight("tier2"));
        assert_eq!(billions.tier_weight("specific"), 0.0);
    }
}
