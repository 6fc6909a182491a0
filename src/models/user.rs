use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// `data` of the upstream `user_status` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStatus {
    #[serde(default, deserialize_with = "lenient_count")]
    pub follower_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub smart_follower_count: u64,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// `data` of the upstream `yap/open` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YapsSummary {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub yaps_all: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub yaps_l24h: f64,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserOverview {
    pub handle: String,
    pub status: UserStatus,
    pub yaps: YapsSummary,
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| number_of(&v))
        .filter(|n| *n >= 0.0)
        .map(|n| n as u64)
        .unwrap_or(0))
}

fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| number_of(&v)).unwrap_or(0.0))
}

// Numbers sometimes arrive as strings.
fn number_of(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}
