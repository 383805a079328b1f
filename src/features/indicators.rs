//! Human-readable indicators for explainability.
//!
//! Nothing here depends on a learned model: indicators are derived from the
//! raw body, headers and URL features, so they are available even when every
//! scoring artifact is missing.

use super::url_features::{normalize_url, UrlFeatureExtractor, UrlParts};
use super::{get_header_case_insensitive, FeatureSchema};
use crate::domain_utils::DomainUtils;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Body phrases typical of credential phishing and advance-fee scams
pub const CONTENT_KEYWORDS: [&str; 17] = [
    "urgent",
    "verify",
    "account",
    "suspended",
    "lottery",
    "winner",
    "bank",
    "password",
    "login",
    "confirm",
    "security",
    "alert",
    "expires",
    "immediately",
    "click here",
    "act now",
    "limited time",
];

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(
        r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\\(\\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+"
    )
    .unwrap();
}

/// All http(s) URLs in the text, in order of appearance
pub fn find_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SenderMismatch {
    pub detected: bool,
    pub from_domain: String,
    pub reply_to_domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub suspicious_keywords: BTreeSet<String>,
    pub detected_urls: Vec<String>,
    pub sender_mismatch: Option<SenderMismatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlIndicators {
    pub domain: String,
    pub no_https: bool,
    pub suspicious_tld: bool,
    pub has_ip_address: bool,
    pub url_shortener: bool,
    pub path_depth: u32,
    pub special_chars: u32,
    /// Only the advanced schema counts URL keywords
    #[serde(rename = "suspicious_keywords", skip_serializing_if = "Option::is_none")]
    pub suspicious_keywords_count: Option<u32>,
}

/// Keywords, URLs and sender alignment for an email body
pub fn extract_indicators(body: &str, headers: Option<&HashMap<String, String>>) -> IndicatorSet {
    let body_lower = body.to_lowercase();
    let suspicious_keywords = CONTENT_KEYWORDS
        .iter()
        .filter(|word| body_lower.contains(*word))
        .map(|word| word.to_string())
        .collect();

    IndicatorSet {
        suspicious_keywords,
        detected_urls: find_urls(body),
        sender_mismatch: headers.and_then(detect_sender_mismatch),
    }
}

fn header_value(headers: &HashMap<String, String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| get_header_case_insensitive(headers, name))
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Flags a Reply-To that routes answers to a different domain than From.
/// Different mailboxes on the same domain are not a mismatch.
pub fn detect_sender_mismatch(headers: &HashMap<String, String>) -> Option<SenderMismatch> {
    let from_addr = header_value(headers, &["from"])?;
    let reply_to = header_value(headers, &["reply_to", "reply-to"])?;

    if from_addr == reply_to || !from_addr.contains('@') || !reply_to.contains('@') {
        return None;
    }

    let from_domain = DomainUtils::extract_domain(&from_addr)?;
    let reply_to_domain = DomainUtils::extract_domain(&reply_to)?;
    if from_domain == reply_to_domain {
        return None;
    }

    log::debug!(
        "Sender mismatch: from {} but reply-to {}",
        from_domain,
        reply_to_domain
    );
    Some(SenderMismatch {
        detected: true,
        from_domain,
        reply_to_domain,
    })
}

/// Indicator view of a single URL under the given schema
pub fn url_indicators(url: &str, schema: FeatureSchema) -> UrlIndicators {
    let features = UrlFeatureExtractor::new(schema).features(url);
    let normalized = normalize_url(url);
    let parts = UrlParts::split(&normalized);

    UrlIndicators {
        domain: parts.netloc.to_string(),
        no_https: features.has_https == 0.0,
        suspicious_tld: features.suspicious_tld == 1.0,
        has_ip_address: features.has_ip_address == 1.0,
        url_shortener: features.url_shortener == 1.0,
        path_depth: features.path_depth as u32,
        special_chars: features.special_char_count as u32,
        suspicious_keywords_count: match schema {
            FeatureSchema::Advanced => Some(features.suspicious_keywords as u32),
            FeatureSchema::Basic => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_find_urls() {
        let body = "Click http://bit.ly/abc now or visit https://example.com/login?x=1 today";
        assert_eq!(
            find_urls(body),
            vec![
                "http://bit.ly/abc".to_string(),
                "https://example.com/login?x=1".to_string()
            ]
        );
        assert!(find_urls("no links here, just www.example.com").is_empty());
    }

    #[test]
    fn test_keywords_are_deduplicated() {
        let set = extract_indicators(
            "URGENT: verify your account. Verify now! Click here.",
            None,
        );
        let keywords: Vec<&str> = set.suspicious_keywords.iter().map(|s| s.as_str()).collect();
        assert_eq!(keywords, vec!["account", "click here", "urgent", "verify"]);
        assert!(set.sender_mismatch.is_none());
    }

    #[test]
    fn test_sender_mismatch_different_domains() {
        let h = headers(&[("from", "support@paypal.com"), ("reply_to", "refunds@evil.tk")]);
        let mismatch = detect_sender_mismatch(&h).unwrap();
        assert!(mismatch.detected);
        assert_eq!(mismatch.from_domain, "paypal.com");
        assert_eq!(mismatch.reply_to_domain, "evil.tk");
    }

    #[test]
    fn test_sender_mismatch_same_domain() {
        let h = headers(&[("from", "alice@corp.com"), ("reply_to", "bob@corp.com")]);
        assert!(detect_sender_mismatch(&h).is_none());

        let h = headers(&[
            ("From", "\"Alice\" <alice@Corp.com>"),
            ("Reply-To", "alice@corp.com"),
        ]);
        assert!(detect_sender_mismatch(&h).is_none());
    }

    #[test]
    fn test_sender_mismatch_requires_both_addresses() {
        let h = headers(&[("from", "alice@corp.com")]);
        assert!(detect_sender_mismatch(&h).is_none());

        let h = headers(&[("from", "alice@corp.com"), ("reply_to", "")]);
        assert!(detect_sender_mismatch(&h).is_none());

        let h = headers(&[("from", "alice@corp.com"), ("reply_to", "not-an-address")]);
        assert!(detect_sender_mismatch(&h).is_none());
    }

    #[test]
    fn test_url_indicators() {
        let ind = url_indicators("http://192.168.0.10/secure/login", FeatureSchema::Advanced);
        assert_eq!(ind.domain, "192.168.0.10");
        assert!(ind.no_https);
        assert!(ind.has_ip_address);
        assert!(!ind.suspicious_tld);
        assert_eq!(ind.path_depth, 2);
        assert_eq!(ind.suspicious_keywords_count, Some(2));

        let ind = url_indicators("https://tinyurl.com/x", FeatureSchema::Basic);
        assert!(ind.url_shortener);
        assert!(!ind.no_https);
        assert_eq!(ind.suspicious_keywords_count, None);
        let json = serde_json::to_value(&ind).unwrap();
        assert!(json.get("suspicious_keywords").is_none());
    }

    #[test]
    fn test_url_indicators_survive_malformed_input() {
        let ind = url_indicators("not a url @@@ ::", FeatureSchema::Advanced);
        assert!(ind.no_https);
        assert!(!ind.has_ip_address);
        assert_eq!(ind.special_chars, 0);
    }
}
