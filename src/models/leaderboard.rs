use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single row of the upstream `leaderboard-search` response.
///
/// Every field is optional and parsed leniently: a value of the wrong JSON
/// type is read as absent instead of failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub topic_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tier: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub mindshare: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rank: Option<f64>,
}

impl LeaderboardRow {
    pub fn new(topic_id: &str, duration: &str, tier: &str) -> Self {
        Self {
            topic_id: Some(topic_id.to_string()),
            duration: Some(duration.to_string()),
            tier: Some(tier.to_string()),
            mindshare: None,
            rank: None,
        }
    }

    pub fn with_mindshare(mut self, mindshare: f64) -> Self {
        self.mindshare = Some(mindshare);
        self
    }

    pub fn with_rank(mut self, rank: f64) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Extract rows from a `{ "data": [...] }` envelope.
    ///
    /// A missing or non-array `data` yields no rows; elements that are not
    /// objects become empty rows and are dropped later by topic filtering.
    pub fn from_envelope(body: &Value) -> Vec<LeaderboardRow> {
        match body.get("data") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| serde_json::from_value(item.clone()).unwrap_or_default())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A row that passed project filtering, with canonical casing applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub topic_id: String,
    /// Upper-cased, e.g. `3M`.
    pub duration: String,
    /// Lower-cased, e.g. `tier1`. Empty when upstream omitted it.
    pub tier: String,
    /// Raw upstream value; clamping happens at scoring time.
    pub mindshare: Option<f64>,
    /// Finite, positive rank or `None` for unranked.
    pub rank: Option<f64>,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|n| n.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_with_non_array_data_is_empty() {
        assert!(LeaderboardRow::from_envelope(&json!({ "data": null })).is_empty());
        assert!(LeaderboardRow::from_envelope(&json!({ "data": { "rows": [] } })).is_empty());
        assert!(LeaderboardRow::from_envelope(&json!({})).is_empty());
    }

    #[test]
    fn test_wrong_typed_fields_become_absent() {
        let body = json!({
            "data": [
                { "topic_id": "IRYS", "duration": "3M", "tier": "tier1", "mindshare": "lots", "rank": null },
                42,
            ]
        });

        let rows = LeaderboardRow::from_envelope(&body);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].topic_id.as_deref(), Some("IRYS"));
        assert_eq!(rows[0].mindshare, None);
        assert_eq!(rows[0].rank, None);
        assert_eq!(rows[1], LeaderboardRow::default());
    }

    #[test]
    fn test_numeric_fields_parse() {
        let body = json!({
            "data": [{ "topic_id": "BILLIONS", "duration": "30D", "tier": "TIER2", "mindshare": 1.25, "rank": 17 }]
        });

        let rows = LeaderboardRow::from_envelope(&body);
        assert_eq!(rows[0].mindshare, Some(1.25));
        assert_eq!(rows[0].rank, Some(17.0));
        assert_eq!(rows[0].tier.as_deref(), Some("TIER2"));
    }
}
