//! Response extraction and error sanitization
//!
//! Models are asked for a bare prompt but sometimes wrap it in `<prompt>`
//! tags or pad it with commentary; extraction prefers the tagged form.
//! Sanitization strips credential material out of error text before it can
//! reach the response boundary.

use once_cell::sync::Lazy;
use regex::Regex;

static PROMPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<prompt>(.*?)</prompt>").expect("valid prompt-tag pattern"));

static ANTHROPIC_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sk-ant-[a-zA-Z0-9_-]+").expect("valid key pattern"));

static OPENROUTER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sk-or-[a-zA-Z0-9_-]+").expect("valid key pattern"));

static BEARER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Bearer [a-zA-Z0-9_-]+").expect("valid bearer pattern"));

/// Pull the prompt out of raw model output.
///
/// Returns the trimmed content of the first `<prompt>…</prompt>` pair when
/// present, otherwise the trimmed raw text. Empty input (or an empty tag
/// body) yields `None` so the caller can treat it as a failed attempt rather
/// than a silent blank prompt.
pub fn extract_prompt(raw: &str) -> Option<String> {
    let text = match PROMPT_TAG.captures(raw) {
        Some(captures) => captures[1].trim().to_string(),
        None => raw.trim().to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Redact credential material from an error message.
///
/// Both vendor key formats and bearer tokens are replaced with a fixed
/// marker. Runs on every error string that reaches the response boundary.
pub fn sanitize_error(error: &str) -> String {
    if error.is_empty() {
        return "Unknown error".to_string();
    }

    let sanitized = ANTHROPIC_KEY.replace_all(error, "[REDACTED]");
    let sanitized = OPENROUTER_KEY.replace_all(&sanitized, "[REDACTED]");
    let sanitized = BEARER_TOKEN.replace_all(&sanitized, "Bearer [REDACTED]");
    sanitized.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tagged_prompt() {
        assert_eq!(
            extract_prompt("blah <prompt>A cat in rain</prompt> blah"),
            Some("A cat in rain".to_string())
        );
    }

    #[test]
    fn tag_body_is_trimmed() {
        assert_eq!(
            extract_prompt("<prompt>\n  neon alley, rain-slick asphalt  \n</prompt>"),
            Some("neon alley, rain-slick asphalt".to_string())
        );
    }

    #[test]
    fn tag_match_spans_newlines() {
        assert_eq!(
            extract_prompt("<prompt>line one\nline two</prompt>"),
            Some("line one\nline two".to_string())
        );
    }

    #[test]
    fn untagged_text_is_returned_trimmed() {
        assert_eq!(
            extract_prompt("  A cat in rain  "),
            Some("A cat in rain".to_string())
        );
    }

    #[test]
    fn empty_input_yields_none() {
        assert_eq!(extract_prompt(""), None);
        assert_eq!(extract_prompt("   \n "), None);
        assert_eq!(extract_prompt("<prompt>  </prompt>"), None);
    }

    #[test]
    fn redacts_vendor_keys() {
        let sanitized = sanitize_error("HTTP 401: key sk-ant-abc_123 rejected");
        assert_eq!(sanitized, "HTTP 401: key [REDACTED] rejected");

        let sanitized = sanitize_error("bad key sk-or-v1-deadbeef");
        assert_eq!(sanitized, "bad key [REDACTED]");
    }

    #[test]
    fn redacts_bearer_tokens() {
        let sanitized = sanitize_error("header was Authorization: Bearer abc123XYZ");
        assert_eq!(sanitized, "header was Authorization: Bearer [REDACTED]");
    }

    #[test]
    fn empty_error_maps_to_unknown() {
        assert_eq!(sanitize_error(""), "Unknown error");
    }

    #[test]
    fn clean_text_passes_through() {
        assert_eq!(sanitize_error("HTTP 500"), "HTTP 500");
    }
}
