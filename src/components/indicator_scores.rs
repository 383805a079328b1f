//! Indicator Score Aggregator
//!
//! Advisory 0-100 sub-scores computed from indicators only. They are
//! independent of any model confidence and always available.

use super::rule_scorer::flag_points;
use crate::features::{IndicatorSet, UrlIndicators};
use serde::Serialize;

const KEYWORD_POINTS: u32 = 15;
const SENDER_MISMATCH_SCORE: u32 = 75;
const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndicatorScores {
    pub keywords_score: u32,
    pub url_score: u32,
    pub header_score: u32,
}

/// Score block of a URL-only verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UrlOnlyScores {
    pub url_score: u32,
}

pub fn keywords_score(indicators: &IndicatorSet) -> u32 {
    (indicators.suspicious_keywords.len() as u32 * KEYWORD_POINTS).min(MAX_SCORE)
}

/// Points summed over all URLs, clamped once at the end
pub fn url_score(url_indicators: &[UrlIndicators]) -> u32 {
    let total: u32 = url_indicators
        .iter()
        .map(|ind| {
            flag_points(
                ind.no_https,
                ind.suspicious_tld,
                ind.has_ip_address,
                ind.url_shortener,
            )
        })
        .sum();
    total.min(MAX_SCORE)
}

pub fn header_score(indicators: &IndicatorSet) -> u32 {
    if indicators.sender_mismatch.is_some() {
        SENDER_MISMATCH_SCORE
    } else {
        0
    }
}

impl IndicatorScores {
    pub fn calculate(indicators: &IndicatorSet, url_indicators: &[UrlIndicators]) -> Self {
        Self {
            keywords_score: keywords_score(indicators),
            url_score: url_score(url_indicators),
            header_score: header_score(indicators),
        }
    }
}
