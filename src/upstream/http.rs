use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    models::{LeaderboardRow, Result, UserStatus, YapScoreError, YapsSummary},
    upstream::client::{LeaderboardSource, UpstreamConfig},
};

pub const LEADERBOARD_PATH: &str = "kaito/leaderboard-search";
pub const USER_STATUS_PATH: &str = "kaito/user_status";
pub const YAPS_PATH: &str = "yap/open";

/// `LeaderboardSource` backed by the upstream JSON API over HTTP.
pub struct HttpUpstream {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpUpstream {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_envelope(&self, path: &str, handle: &str) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} for {}", url, handle);

        let response = self
            .http_client
            .get(&url)
            .query(&[("username", handle)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream {} answered {} for {}", path, status, handle);
            return Err(YapScoreError::UpstreamStatus {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    async fn get_data<T: DeserializeOwned + Default>(&self, path: &str, handle: &str) -> Result<T> {
        let body = self.get_envelope(path, handle).await?;
        match body.get("data") {
            Some(data) if !data.is_null() => Ok(serde_json::from_value(data.clone())?),
            _ => Ok(T::default()),
        }
    }
}

#[async_trait]
impl LeaderboardSource for HttpUpstream {
    async fn leaderboard(&self, handle: &str) -> Result<Vec<LeaderboardRow>> {
        let body = self.get_envelope(LEADERBOARD_PATH, handle).await?;
        let rows = LeaderboardRow::from_envelope(&body);
        debug!("{} leaderboard rows for {}", rows.len(), handle);
        Ok(rows)
    }

    async fn user_status(&self, handle: &str) -> Result<UserStatus> {
        self.get_data(USER_STATUS_PATH, handle).await
    }

    async fn yaps(&self, handle: &str) -> Result<YapsSummary> {
        self.get_data(YAPS_PATH, handle).await
    }
}
