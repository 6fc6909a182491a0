use crate::models::{LeaderboardRow, NormalizedRow, ProjectConfig};

/// Keep the rows that belong to `project` and an included duration,
/// applying canonical casing.
///
/// Rows with missing tier or mindshare are kept: they contribute nothing at
/// scoring time rather than being rejected here.
pub fn normalize(rows: &[LeaderboardRow], project: &ProjectConfig) -> Vec<NormalizedRow> {
    rows.iter()
        .filter_map(|row| normalize_row(row, project))
        .collect()
}

fn normalize_row(row: &LeaderboardRow, project: &ProjectConfig) -> Option<NormalizedRow> {
    let topic = row.topic_id.as_deref()?.trim();
    if !topic.eq_ignore_ascii_case(&project.topic_id) {
        return None;
    }

    let duration = row.duration.as_deref()?.trim().to_uppercase();
    if !project.includes_duration(&duration) {
        return None;
    }

    Some(NormalizedRow {
        topic_id: topic.to_uppercase(),
        duration,
        tier: row.tier.as_deref().unwrap_or_default().trim().to_lowercase(),
        mindshare: row.mindshare.filter(|m| m.is_finite()),
        rank: row.rank.filter(|r| r.is_finite() && *r > 0.0),
    })
}
