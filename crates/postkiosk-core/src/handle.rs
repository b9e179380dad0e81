//! Handle normalization, validation, and canonical URL building.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Platform rules: 1-15 characters, alphanumeric and underscore only.
static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{1,15}$").expect("handle regex is valid"));

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid handle {handle:?}: {reason}")]
pub struct InvalidHandle {
    pub handle: String,
    pub reason: &'static str,
}

/// Strips delimiter characters (`@`, surrounding whitespace) and validates
/// the result against the platform handle rules.
///
/// # Errors
///
/// Returns [`InvalidHandle`] when the stripped name is empty, too long, or
/// contains characters outside `[A-Za-z0-9_]`.
pub fn normalize_handle(raw: &str) -> Result<String, InvalidHandle> {
    let name = raw.trim().trim_start_matches('@');
    if name.is_empty() {
        return Err(InvalidHandle {
            handle: raw.to_owned(),
            reason: "empty after stripping delimiters",
        });
    }
    if name.len() > 15 {
        return Err(InvalidHandle {
            handle: raw.to_owned(),
            reason: "longer than 15 characters",
        });
    }
    if !HANDLE_RE.is_match(name) {
        return Err(InvalidHandle {
            handle: raw.to_owned(),
            reason: "contains characters outside [A-Za-z0-9_]",
        });
    }
    Ok(name.to_owned())
}

/// Canonical URL for a single post, built from handle and post identifier.
/// Deterministic: the QR artifact rendered next to a post encodes exactly this.
#[must_use]
pub fn post_url(username: &str, post_id: &str) -> String {
    format!("https://twitter.com/{username}/status/{post_id}")
}

/// Canonical URL for an account profile.
#[must_use]
pub fn profile_url(username: &str) -> String {
    format!("https://twitter.com/{username}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_char() {
        assert_eq!(normalize_handle("a").unwrap(), "a");
    }

    #[test]
    fn accepts_mixed_case_digits_underscore() {
        assert_eq!(normalize_handle("A_9").unwrap(), "A_9");
    }

    #[test]
    fn accepts_max_length() {
        let name = "x".repeat(15);
        assert_eq!(normalize_handle(&name).unwrap(), name);
    }

    #[test]
    fn strips_at_prefix_and_whitespace() {
        assert_eq!(normalize_handle(" @imVkohli ").unwrap(), "imVkohli");
    }

    #[test]
    fn rejects_empty() {
        assert!(normalize_handle("").is_err());
        assert!(normalize_handle("@").is_err());
    }

    #[test]
    fn rejects_over_length() {
        assert!(normalize_handle(&"x".repeat(16)).is_err());
    }

    #[test]
    fn rejects_inner_whitespace() {
        let err = normalize_handle("bad handle").unwrap_err();
        assert_eq!(err.handle, "bad handle");
    }

    #[test]
    fn rejects_punctuation() {
        assert!(normalize_handle("no-dashes").is_err());
        assert!(normalize_handle("dots.no").is_err());
    }

    #[test]
    fn post_url_is_deterministic() {
        assert_eq!(
            post_url("BCCI", "123456"),
            "https://twitter.com/BCCI/status/123456"
        );
    }

    #[test]
    fn profile_url_shape() {
        assert_eq!(profile_url("ICC"), "https://twitter.com/ICC");
    }
}
