//! Response objects returned to callers.
//!
//! Field names here are a wire contract with existing consumers.

use crate::components::indicator_scores::UrlOnlyScores;
use crate::components::{ClassifierResult, IndicatorScores, Label};
use crate::features::{SenderMismatch, UrlIndicators};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// Sub-classifier summary; `prediction` is "N/A" when the classifier did not run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubResult {
    pub prediction: String,
    pub confidence: f64,
}

impl SubResult {
    pub fn not_applicable() -> Self {
        Self {
            prediction: "N/A".to_string(),
            confidence: 0.0,
        }
    }
}

impl From<&ClassifierResult> for SubResult {
    fn from(result: &ClassifierResult) -> Self {
        Self {
            prediction: result.prediction.to_string(),
            confidence: result.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classifiers {
    pub content_classifier: SubResult,
    pub url_classifier: SubResult,
}

fn indicators_or_empty<S: Serializer>(
    value: &Option<UrlIndicators>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(indicators) => indicators.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailIndicators {
    pub suspicious_keywords: BTreeSet<String>,
    pub suspicious_urls: Vec<String>,
    pub sender_mismatch: Option<SenderMismatch>,
    /// Indicators of the first URL, `{}` when the email has none
    #[serde(serialize_with = "indicators_or_empty")]
    pub url_features: Option<UrlIndicators>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullEmailVerdict {
    pub prediction: Label,
    pub confidence: f64,
    pub risk_percentage: u8,
    pub classifiers: Classifiers,
    pub indicators: EmailIndicators,
    pub indicator_scores: IndicatorScores,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlOnlyVerdict {
    pub prediction: Label,
    pub confidence: f64,
    pub risk_percentage: u8,
    pub url_features: UrlIndicators,
    pub indicator_scores: UrlOnlyScores,
}

/// One verdict per request; never mutated after construction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EnsembleVerdict {
    FullEmail(FullEmailVerdict),
    UrlOnly(UrlOnlyVerdict),
}

impl EnsembleVerdict {
    pub fn mode(&self) -> &'static str {
        match self {
            EnsembleVerdict::FullEmail(_) => "full_email",
            EnsembleVerdict::UrlOnly(_) => "url_only",
        }
    }

    pub fn prediction(&self) -> Label {
        match self {
            EnsembleVerdict::FullEmail(v) => v.prediction,
            EnsembleVerdict::UrlOnly(v) => v.prediction,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            EnsembleVerdict::FullEmail(v) => v.confidence,
            EnsembleVerdict::UrlOnly(v) => v.confidence,
        }
    }

    pub fn risk_percentage(&self) -> u8 {
        match self {
            EnsembleVerdict::FullEmail(v) => v.risk_percentage,
            EnsembleVerdict::UrlOnly(v) => v.risk_percentage,
        }
    }

    /// Shape expected by older clients of the single-endpoint API
    pub fn to_legacy(&self) -> Option<LegacyVerdict> {
        match self {
            EnsembleVerdict::FullEmail(v) => Some(LegacyVerdict {
                classification: v.prediction,
                confidence: v.confidence,
                features: LegacyFeatures {
                    urls: v.indicators.suspicious_urls.clone(),
                    suspicious_keywords: v.indicators.suspicious_keywords.clone(),
                },
            }),
            EnsembleVerdict::UrlOnly(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyFeatures {
    pub urls: Vec<String>,
    pub suspicious_keywords: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyVerdict {
    pub classification: Label,
    pub confidence: f64,
    pub features: LegacyFeatures,
}
