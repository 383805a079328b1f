use super::{FeatureSchema, FeatureVector};
use crate::domain_utils::DomainUtils;
use crate::error::{PhishError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

pub const SUSPICIOUS_TLDS: [&str; 12] = [
    ".tk", ".ml", ".ga", ".cf", ".gq", ".xyz", ".top", ".work", ".bid", ".win", ".pw", ".cc",
];

pub const TRUSTED_TLDS: [&str; 5] = [".com", ".org", ".edu", ".gov", ".net"];

pub const URL_SHORTENERS: [&str; 7] = [
    "bit.ly",
    "tinyurl.com",
    "t.co",
    "goo.gl",
    "ow.ly",
    "buff.ly",
    "is.gd",
];

/// Account-action words that show up in credential harvesting URLs
pub const URL_KEYWORDS: [&str; 6] = ["login", "verify", "secure", "account", "update", "confirm"];

lazy_static! {
    static ref DOTTED_QUAD: Regex = Regex::new(r"^\d+\.\d+\.\d+\.\d+").unwrap();
}

/// Prefix scheme-less input so it parses as a web URL
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// Raw components of a URL string, split without normalisation so lengths
/// and counts reflect what the sender actually wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlParts<'a> {
    pub scheme: String,
    pub netloc: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub fragment: &'a str,
}

impl<'a> UrlParts<'a> {
    pub fn split(url: &'a str) -> Self {
        let mut scheme = String::new();
        let mut rest = url;

        if let Some(colon) = url.find(':') {
            let candidate = &url[..colon];
            let valid = candidate
                .chars()
                .next()
                .map(|c| c.is_ascii_alphabetic())
                .unwrap_or(false)
                && candidate
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            if valid {
                scheme = candidate.to_lowercase();
                rest = &url[colon + 1..];
            }
        }

        let mut netloc = "";
        if let Some(after_slashes) = rest.strip_prefix("//") {
            let end = after_slashes
                .find(|c| matches!(c, '/' | '?' | '#'))
                .unwrap_or(after_slashes.len());
            netloc = &after_slashes[..end];
            rest = &after_slashes[end..];
        }

        let (rest, fragment) = match rest.find('#') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };
        let (path, query) = match rest.find('?') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };

        Self {
            scheme,
            netloc,
            path,
            query,
            fragment,
        }
    }

    /// Host part of the authority, lower-cased, without userinfo or port
    pub fn host(&self) -> String {
        let host = match self.netloc.rfind('@') {
            Some(at) => &self.netloc[at + 1..],
            None => self.netloc,
        };
        let host = if host.starts_with('[') {
            match host.find(']') {
                Some(end) => &host[..=end],
                None => host,
            }
        } else {
            host.rsplit_once(':').map(|(h, _)| h).unwrap_or(host)
        };
        host.to_lowercase()
    }
}

/// Shannon entropy in bits of the lower-cased character distribution
pub fn shannon_entropy(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let total = lowered.chars().count();
    if total == 0 {
        return 0.0;
    }

    let mut frequencies: HashMap<char, usize> = HashMap::new();
    for c in lowered.chars() {
        *frequencies.entry(c).or_insert(0) += 1;
    }

    let total = total as f64;
    -frequencies
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            p * p.log2()
        })
        .sum::<f64>()
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn ratio(count: usize, len: usize) -> f64 {
    count as f64 / len.max(1) as f64
}

/// Every feature either schema can ask for
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UrlFeatures {
    pub url_length: f64,
    pub domain_length: f64,
    pub path_length: f64,
    pub has_https: f64,
    pub has_ip_address: f64,
    pub subdomain_count: f64,
    pub suspicious_tld: f64,
    pub trusted_tld: f64,
    pub url_shortener: f64,
    pub special_char_count: f64,
    pub digit_count: f64,
    pub digit_ratio: f64,
    pub letter_ratio: f64,
    pub has_at_symbol: f64,
    pub has_double_slash: f64,
    pub has_hyphen_in_domain: f64,
    pub consecutive_dots: f64,
    pub path_depth: f64,
    pub query_params_count: f64,
    pub fragment_present: f64,
    pub entropy: f64,
    pub uppercase_ratio: f64,
    pub domain_digit_ratio: f64,
    pub suspicious_keywords: f64,
    pub vowel_ratio: f64,
}

impl UrlFeatures {
    pub fn value(&self, name: &str) -> Option<f64> {
        let value = match name {
            "url_length" => self.url_length,
            "domain_length" => self.domain_length,
            "path_length" => self.path_length,
            "has_https" => self.has_https,
            "has_ip_address" => self.has_ip_address,
            "subdomain_count" => self.subdomain_count,
            "suspicious_tld" => self.suspicious_tld,
            "trusted_tld" => self.trusted_tld,
            "url_shortener" => self.url_shortener,
            "special_char_count" => self.special_char_count,
            "digit_count" => self.digit_count,
            "digit_ratio" => self.digit_ratio,
            "letter_ratio" => self.letter_ratio,
            "has_at_symbol" => self.has_at_symbol,
            "has_double_slash" => self.has_double_slash,
            "has_hyphen_in_domain" => self.has_hyphen_in_domain,
            "consecutive_dots" => self.consecutive_dots,
            "path_depth" => self.path_depth,
            "query_params_count" => self.query_params_count,
            "fragment_present" => self.fragment_present,
            "entropy" => self.entropy,
            "uppercase_ratio" => self.uppercase_ratio,
            "domain_digit_ratio" => self.domain_digit_ratio,
            "suspicious_keywords" => self.suspicious_keywords,
            "vowel_ratio" => self.vowel_ratio,
            _ => return None,
        };
        Some(value)
    }

    /// Project onto a schema, in that schema's trained order
    pub fn to_vector(&self, schema: FeatureSchema) -> FeatureVector {
        let values = schema
            .names()
            .iter()
            .map(|name| self.value(name).unwrap_or(0.0))
            .collect();
        FeatureVector::new(schema, values)
    }
}

/// Derives the fixed URL feature set. Total: malformed input yields zeroed
/// features instead of an error.
#[derive(Debug, Clone, Default)]
pub struct UrlFeatureExtractor {
    schema: FeatureSchema,
}

impl UrlFeatureExtractor {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn extract(&self, url: &str) -> FeatureVector {
        self.features(url).to_vector(self.schema)
    }

    pub fn features(&self, url: &str) -> UrlFeatures {
        match Self::try_features(url) {
            Ok(features) => features,
            Err(e) => {
                log::debug!("{}; using zeroed features", e);
                UrlFeatures::default()
            }
        }
    }

    fn try_features(url: &str) -> Result<UrlFeatures> {
        let normalized = normalize_url(url);
        let parts = UrlParts::split(&normalized);
        let domain = parts.netloc;
        if domain.is_empty() || domain.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(PhishError::FeatureExtraction {
                url: url.to_string(),
                reason: "no usable authority".to_string(),
            });
        }
        // Reputation checks look at the bare host so ports and userinfo can't hide it
        let host = parts.host();
        let path = parts.path;
        let lowered = normalized.to_lowercase();

        let url_len = normalized.chars().count();
        let domain_len = domain.chars().count();

        let digit_count = normalized.chars().filter(|c| c.is_ascii_digit()).count();
        let letter_count = normalized
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .count();
        let uppercase_count = normalized.chars().filter(|c| c.is_uppercase()).count();
        let vowel_count = lowered
            .chars()
            .filter(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
            .count();
        let special_count = normalized
            .chars()
            .filter(|c| !c.is_ascii_alphanumeric())
            .count();
        let domain_digits = domain.chars().filter(|c| c.is_ascii_digit()).count();

        let subdomain_count = if domain.is_empty() {
            0.0
        } else {
            domain.matches('.').count() as f64 - 1.0
        };

        let query_params_count = if parts.query.is_empty() {
            0
        } else {
            parts.query.split('&').count()
        };

        let keyword_hits = URL_KEYWORDS
            .iter()
            .filter(|word| lowered.contains(*word))
            .count();

        Ok(UrlFeatures {
            url_length: url_len as f64,
            domain_length: domain_len as f64,
            path_length: path.chars().count() as f64,
            has_https: flag(parts.scheme == "https"),
            has_ip_address: flag(DOTTED_QUAD.is_match(&host)),
            subdomain_count,
            suspicious_tld: flag(DomainUtils::has_suffix(&host, &SUSPICIOUS_TLDS)),
            trusted_tld: flag(DomainUtils::has_suffix(&host, &TRUSTED_TLDS)),
            url_shortener: flag(DomainUtils::contains_any(&host, &URL_SHORTENERS)),
            special_char_count: special_count as f64,
            digit_count: digit_count as f64,
            digit_ratio: ratio(digit_count, url_len),
            letter_ratio: ratio(letter_count, url_len),
            has_at_symbol: flag(normalized.contains('@')),
            has_double_slash: flag(path.contains("//")),
            has_hyphen_in_domain: flag(domain.contains('-')),
            consecutive_dots: flag(normalized.contains("..")),
            path_depth: path.matches('/').count() as f64,
            query_params_count: query_params_count as f64,
            fragment_present: flag(!parts.fragment.is_empty()),
            entropy: shannon_entropy(&normalized),
            uppercase_ratio: ratio(uppercase_count, url_len),
            domain_digit_ratio: ratio(domain_digits, domain_len),
            suspicious_keywords: keyword_hits as f64,
            vowel_ratio: ratio(vowel_count, url_len),
        })
    }
}
