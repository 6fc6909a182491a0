use crate::models::{Result, YapScoreError};

/// Strip whitespace and a leading `@` from a user-entered handle.
pub fn sanitize_handle(raw: &str) -> Result<String> {
    let handle = raw.trim();
    let handle = handle.strip_prefix('@').unwrap_or(handle).trim();

    if handle.is_empty() || handle.chars().any(char::is_whitespace) {
        return Err(YapScoreError::InvalidHandle(raw.to_string()));
    }

    Ok(handle.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_at_and_whitespace() {
        assert_eq!(sanitize_handle("  @satoshi ").unwrap(), "satoshi");
        assert_eq!(sanitize_handle("vitalik").unwrap(), "vitalik");
    }

    #[test]
    fn test_rejects_empty_and_spaced_handles() {
        assert!(sanitize_handle("").is_err());
        assert!(sanitize_handle(" @ ").is_err());
        assert!(sanitize_handle("two words").is_err());
    }
}
