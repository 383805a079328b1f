//! Decision components of the phishing ensemble
//!
//! Leaf scorers (rule-based fallback, content and URL adapters) produce a
//! [`ClassifierResult`]; the ensemble combiner merges them into one verdict
//! and the indicator score aggregator explains it.

pub mod content_scorer;
pub mod ensemble;
pub mod indicator_scores;
pub mod rule_scorer;
pub mod url_scorer;

pub use content_scorer::ContentScorer;
pub use ensemble::{EnsembleClassifier, EnsemblePolicy};
pub use indicator_scores::IndicatorScores;
pub use url_scorer::UrlScorer;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Phishing,
    Legitimate,
    Unknown,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Phishing => "phishing",
            Label::Legitimate => "legitimate",
            Label::Unknown => "unknown",
        }
    }

    pub fn is_phishing(&self) -> bool {
        matches!(self, Label::Phishing)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Output of a single sub-classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResult {
    pub prediction: Label,
    pub confidence: f64,
    #[serde(default)]
    pub rule_based: bool,
}

impl ClassifierResult {
    pub fn new(prediction: Label, confidence: f64) -> Self {
        Self {
            prediction,
            confidence: confidence.clamp(0.0, 1.0),
            rule_based: false,
        }
    }

    pub fn rule_based(prediction: Label, confidence: f64) -> Self {
        Self {
            rule_based: true,
            ..Self::new(prediction, confidence)
        }
    }

    /// Sentinel for a classifier with no usable model
    pub fn unknown() -> Self {
        Self::new(Label::Unknown, 0.0)
    }

    pub fn is_unknown(&self) -> bool {
        self.prediction == Label::Unknown
    }
}

/// 0-100 score of how phishing-like a result is, whichever label won
pub fn risk_percentage(prediction: Label, confidence: f64) -> u8 {
    let phishing_mass = if prediction.is_phishing() {
        confidence
    } else {
        1.0 - confidence
    };
    (phishing_mass * 100.0).round().clamp(0.0, 100.0) as u8
}
