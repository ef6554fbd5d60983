//! Redaction rules
//!
//! Two rule families exist. Key rules look at a mapping key and pick a
//! [`MaskStrategy`] for the whole value under it. Content rules run over
//! every string and rewrite the secret-looking parts in place.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::REDACTED;

/// Header names masked by exact (case-insensitive) match
pub const SENSITIVE_HEADER_KEYS: &[&str] = &[
    "authorization",
    "proxy-authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
];

/// Cookie attribute flags that carry no value and are kept as-is
const COOKIE_FLAGS: &[&str] = &["httponly", "secure", "partitioned"];

static SENSITIVE_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(token|secret|api[-_]?key|password|authorization|cookie)")
        .expect("sensitive key pattern is valid")
});

static BEARER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^bearer\s+").expect("bearer prefix pattern is valid"));

static BASIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^basic\s+").expect("basic prefix pattern is valid"));

/// How a value under a sensitive key is masked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskStrategy {
    /// Replace the whole value
    Full,
    /// Keep each `name=` prefix of a `;`-separated cookie list
    Cookie,
    /// Keep a `Bearer`/`Basic` scheme word
    Scheme,
}

impl MaskStrategy {
    /// Mask a string value under this strategy
    pub fn mask_str(&self, value: &str) -> String {
        match self {
            MaskStrategy::Full => REDACTED.to_string(),
            MaskStrategy::Cookie => redact_cookie_value(value),
            MaskStrategy::Scheme => redact_authorization_value(value),
        }
    }
}

/// Pick the masking strategy for a mapping key, if the key is sensitive
pub fn strategy_for_key(key: &str) -> Option<MaskStrategy> {
    let lower = key.to_ascii_lowercase();
    let sensitive = SENSITIVE_HEADER_KEYS.contains(&lower.as_str())
        || SENSITIVE_KEY_PATTERN.is_match(key);
    if !sensitive {
        return None;
    }

    if lower.contains("cookie") {
        Some(MaskStrategy::Cookie)
    } else if lower.contains("authorization") {
        Some(MaskStrategy::Scheme)
    } else {
        Some(MaskStrategy::Full)
    }
}

/// Mask every value of a `;`-separated cookie list, keeping the names
///
/// `"sid=abc; theme=dark"` becomes `"sid=<redacted>; theme=<redacted>"`.
/// Segments without a `=` are masked whole unless they are a bare cookie
/// attribute such as `HttpOnly`.
pub fn redact_cookie_value(value: &str) -> String {
    value
        .split(';')
        .map(|part| {
            let segment = part.trim();
            if segment.is_empty() || segment == REDACTED {
                return segment.to_string();
            }
            match segment.find('=') {
                Some(idx) => {
                    let name = segment[..idx].trim();
                    if name.is_empty() {
                        REDACTED.to_string()
                    } else {
                        format!("{}={}", name, REDACTED)
                    }
                }
                None if COOKIE_FLAGS.contains(&segment.to_ascii_lowercase().as_str()) => {
                    segment.to_string()
                }
                None => REDACTED.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Mask an authorization header value, keeping the scheme word
pub fn redact_authorization_value(value: &str) -> String {
    if BEARER_PREFIX.is_match(value) {
        "Bearer <redacted>".to_string()
    } else if BASIC_PREFIX.is_match(value) {
        "Basic <redacted>".to_string()
    } else {
        REDACTED.to_string()
    }
}

/// What a content rule substitutes for a match
#[derive(Debug, Clone, Copy)]
enum Replacement {
    /// Replace the whole match with a literal
    Literal(&'static str),
    /// Keep capture 1 (prefix) and 2 (optional quote), mask the rest
    KeepPrefix,
    /// As `KeepPrefix`, also keeping an authorization scheme in capture 3
    KeepScheme,
    /// Keep capture 1, cookie-mask capture 2
    CookieTail,
}

/// A content-based rule applied to every string
#[derive(Debug)]
pub struct RedactionRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: Replacement,
}

impl RedactionRule {
    fn new(name: &'static str, pattern: &str, replacement: Replacement) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("built-in redaction pattern is valid"),
            replacement,
        }
    }

    /// Apply the rule to `input`
    pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match self.replacement {
            Replacement::Literal(text) => self.pattern.replace_all(input, text),
            Replacement::KeepPrefix => self.pattern.replace_all(input, |caps: &Captures| {
                format!("{}{}{}", &caps[1], &caps[2], REDACTED)
            }),
            Replacement::KeepScheme => self.pattern.replace_all(input, |caps: &Captures| {
                let scheme = match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
                    Some(word) if word == "bearer" => "Bearer ",
                    Some(word) if word == "basic" => "Basic ",
                    _ => "",
                };
                format!("{}{}{}{}", &caps[1], &caps[2], scheme, REDACTED)
            }),
            Replacement::CookieTail => self.pattern.replace_all(input, |caps: &Captures| {
                format!("{}{}", &caps[1], redact_cookie_value(&caps[2]))
            }),
        }
    }
}

/// Built-in content rules, in application order
pub static CONTENT_RULES: LazyLock<Vec<RedactionRule>> = LazyLock::new(|| {
    vec![
        RedactionRule::new(
            "bearer",
            r"(?i)\bBearer\s+[A-Za-z0-9\-._~+/]+=*",
            Replacement::Literal("Bearer <redacted>"),
        ),
        RedactionRule::new(
            "jwt",
            r"\b[A-Za-z0-9_-]{16,}\.[A-Za-z0-9_-]{16,}\.[A-Za-z0-9_-]{16,}\b",
            Replacement::Literal(REDACTED),
        ),
        RedactionRule::new(
            "openai-project-key",
            r"\bsk-proj-[A-Za-z0-9_-]{20,}\b",
            Replacement::Literal(REDACTED),
        ),
        RedactionRule::new(
            "openai-key",
            r"\bsk-[A-Za-z0-9]{20,}\b",
            Replacement::Literal(REDACTED),
        ),
        RedactionRule::new(
            "github-token",
            r"\bgh[pousr]_[A-Za-z0-9]{20,}\b",
            Replacement::Literal(REDACTED),
        ),
        RedactionRule::new(
            "google-api-key",
            r"\bAIza[0-9A-Za-z\-_]{35}\b",
            Replacement::Literal(REDACTED),
        ),
        RedactionRule::new(
            "aws-access-key",
            r"\bAKIA[0-9A-Z]{16}\b",
            Replacement::Literal(REDACTED),
        ),
        RedactionRule::new(
            "inline-api-key",
            r#"(?i)(api[_-]?key\s*[:=]\s*)(['"]?)[^'",;\s]+"#,
            Replacement::KeepPrefix,
        ),
        RedactionRule::new(
            "inline-token",
            r#"(?i)(token\s*[:=]\s*)(['"]?)[^'",;\s]+"#,
            Replacement::KeepPrefix,
        ),
        RedactionRule::new(
            "inline-authorization",
            r#"(?i)(authorization\s*[:=]\s*)(['"]?)(?:(bearer|basic)\s+)?[^'",;\s]+"#,
            Replacement::KeepScheme,
        ),
        RedactionRule::new(
            "inline-cookie",
            r"(?i)(cookie\s*[:=]\s*)([^\r\n]+)",
            Replacement::CookieTail,
        ),
        RedactionRule::new(
            "inline-set-cookie",
            r"(?i)(set-cookie\s*[:=]\s*)([^\r\n]+)",
            Replacement::CookieTail,
        ),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_for_header_keys() {
        assert_eq!(strategy_for_key("Authorization"), Some(MaskStrategy::Scheme));
        assert_eq!(
            strategy_for_key("proxy-authorization"),
            Some(MaskStrategy::Scheme)
        );
        assert_eq!(strategy_for_key("Cookie"), Some(MaskStrategy::Cookie));
        assert_eq!(strategy_for_key("set-cookie"), Some(MaskStrategy::Cookie));
        assert_eq!(strategy_for_key("X-API-Key"), Some(MaskStrategy::Full));
    }

    #[test]
    fn test_strategy_for_pattern_keys() {
        assert_eq!(strategy_for_key("apiKey"), Some(MaskStrategy::Full));
        assert_eq!(strategy_for_key("refresh_token"), Some(MaskStrategy::Full));
        assert_eq!(strategy_for_key("clientSecret"), Some(MaskStrategy::Full));
        assert_eq!(strategy_for_key("PASSWORD"), Some(MaskStrategy::Full));
        assert_eq!(strategy_for_key("sessionCookie"), Some(MaskStrategy::Cookie));
    }

    #[test]
    fn test_non_sensitive_keys() {
        for key in ["method", "threadId", "turnId", "requestId", "status", "params"] {
            assert_eq!(strategy_for_key(key), None, "{key} should not be sensitive");
        }
    }

    #[test]
    fn test_cookie_masking_keeps_names() {
        assert_eq!(
            redact_cookie_value("sid=abc123; theme=dark"),
            "sid=<redacted>; theme=<redacted>"
        );
        assert_eq!(
            redact_cookie_value("a=1;b=2;  c=3"),
            "a=<redacted>; b=<redacted>; c=<redacted>"
        );
    }

    #[test]
    fn test_cookie_masking_bare_segments() {
        assert_eq!(
            redact_cookie_value("id=1; HttpOnly; Secure"),
            "id=<redacted>; HttpOnly; Secure"
        );
        assert_eq!(redact_cookie_value("opaque-session-blob"), REDACTED);
        assert_eq!(redact_cookie_value("=orphan"), REDACTED);
    }

    #[test]
    fn test_authorization_scheme_preserved() {
        assert_eq!(
            redact_authorization_value("Bearer abc.def"),
            "Bearer <redacted>"
        );
        assert_eq!(
            redact_authorization_value("basic dXNlcjpwYXNz"),
            "Basic <redacted>"
        );
        assert_eq!(redact_authorization_value("Digest xyz"), REDACTED);
    }

    #[test]
    fn test_content_rule_names_are_unique() {
        let mut names: Vec<_> = CONTENT_RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CONTENT_RULES.len());
    }

    #[test]
    fn test_keep_prefix_rule_preserves_quote() {
        let rule = CONTENT_RULES
            .iter()
            .find(|r| r.name == "inline-api-key")
            .unwrap();
        assert_eq!(rule.apply("api_key='abc123'"), "api_key='<redacted>'");
    }
}
