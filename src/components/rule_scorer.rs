//! Rule-Based Fallback Scorer
//!
//! Scores a URL from its features alone. Used whenever no URL model artifact
//! is loaded, so it must never fail.

use super::{ClassifierResult, Label};
use crate::features::FeatureVector;

const NO_HTTPS_POINTS: u32 = 20;
const SUSPICIOUS_TLD_POINTS: u32 = 30;
const IP_ADDRESS_POINTS: u32 = 25;
const SHORTENER_POINTS: u32 = 15;

/// Scores above this are phishing
const PHISHING_THRESHOLD: u32 = 40;
const MAX_PHISHING_CONFIDENCE: f64 = 0.95;
const LEGITIMATE_CONFIDENCE: f64 = 0.7;

/// Points for each structural red flag of a URL. The indicator scores use
/// the same table.
pub fn flag_points(
    no_https: bool,
    suspicious_tld: bool,
    has_ip_address: bool,
    url_shortener: bool,
) -> u32 {
    let mut score = 0;
    if no_https {
        score += NO_HTTPS_POINTS;
    }
    if suspicious_tld {
        score += SUSPICIOUS_TLD_POINTS;
    }
    if has_ip_address {
        score += IP_ADDRESS_POINTS;
    }
    if url_shortener {
        score += SHORTENER_POINTS;
    }
    score
}

/// Integer risk points for the structural red flags in a feature vector
pub fn risk_score(features: &FeatureVector) -> u32 {
    flag_points(
        !features.flag("has_https"),
        features.flag("suspicious_tld"),
        features.flag("has_ip_address"),
        features.flag("url_shortener"),
    )
}

pub fn score(features: &FeatureVector) -> ClassifierResult {
    let points = risk_score(features);
    if points > PHISHING_THRESHOLD {
        let confidence = (points as f64 / 100.0 + 0.5).min(MAX_PHISHING_CONFIDENCE);
        ClassifierResult::rule_based(Label::Phishing, confidence)
    } else {
        ClassifierResult::rule_based(Label::Legitimate, LEGITIMATE_CONFIDENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureSchema, UrlFeatureExtractor};

    fn vector(url: &str) -> FeatureVector {
        UrlFeatureExtractor::new(FeatureSchema::Advanced).extract(url)
    }

    #[test]
    fn test_risk_points() {
        assert_eq!(risk_score(&vector("https://example.com")), 0);
        assert_eq!(risk_score(&vector("http://example.com")), 20);
        assert_eq!(risk_score(&vector("https://prize.tk/claim")), 30);
        assert_eq!(risk_score(&vector("http://prize.tk/claim")), 50);
        assert_eq!(risk_score(&vector("http://10.0.0.1/")), 45);
        assert_eq!(risk_score(&vector("http://bit.ly/x")), 35);
        assert_eq!(risk_score(&vector("https://bit.ly/x")), 15);
    }

    #[test]
    fn test_phishing_verdicts() {
        let result = score(&vector("http://prize.tk/claim"));
        assert_eq!(result.prediction, Label::Phishing);
        assert!((result.confidence - 0.95).abs() < 1e-9);
        assert!(result.rule_based);

        let result = score(&vector("http://10.0.0.1/"));
        assert_eq!(result.prediction, Label::Phishing);
        assert!((result.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_port_does_not_hide_suspicious_tld() {
        let result = score(&vector("http://paypal-verify.tk:99999/login"));
        assert_eq!(result.prediction, Label::Phishing);
        assert!((result.confidence - 0.95).abs() < 1e-9);

        let result = score(&vector("http://999.999.999.999/login"));
        assert_eq!(result.prediction, Label::Phishing);
    }

    #[test]
    fn test_flag_points_table() {
        assert_eq!(flag_points(false, false, false, false), 0);
        assert_eq!(flag_points(true, false, false, false), 20);
        assert_eq!(flag_points(false, true, false, false), 30);
        assert_eq!(flag_points(false, false, true, false), 25);
        assert_eq!(flag_points(false, false, false, true), 15);
        assert_eq!(flag_points(true, true, true, true), 90);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // 35 points: no https + shortener
        let result = score(&vector("http://bit.ly/x"));
        assert_eq!(result.prediction, Label::Legitimate);
        assert_eq!(result.confidence, 0.7);
        assert!(result.rule_based);
    }

    #[test]
    fn test_zeroed_vector_is_scored() {
        // A failed extraction reads as plain http
        let zeroed = FeatureVector::zeroed(FeatureSchema::Basic);
        assert_eq!(risk_score(&zeroed), 20);
        assert_eq!(score(&zeroed).prediction, Label::Legitimate);
    }
}
