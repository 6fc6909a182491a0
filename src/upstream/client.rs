use async_trait::async_trait;

use crate::models::{LeaderboardRow, Result, UserStatus, YapsSummary};

/// Read access to the upstream leaderboard API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardSource: Send + Sync {
    /// All leaderboard rows for a handle, across every topic.
    async fn leaderboard(&self, handle: &str) -> Result<Vec<LeaderboardRow>>;

    /// Follower counts and other profile data.
    async fn user_status(&self, handle: &str) -> Result<UserStatus>;

    /// Yap totals.
    async fn yaps(&self, handle: &str) -> Result<YapsSummary>;
}

/// Configuration for upstream clients
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub user_agent: String,
}

impl From<&crate::config::settings::UpstreamSettings> for UpstreamConfig {
    fn from(settings: &crate::config::settings::UpstreamSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            timeout_seconds: settings.timeout_seconds,
            user_agent: settings.user_agent.clone(),
        }
    }
}
