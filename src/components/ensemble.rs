//! Ensemble Combiner
//!
//! Merges the content classifier and the per-URL classifiers into one
//! verdict, then attaches indicators and indicator scores for explainability.

use super::indicator_scores::{IndicatorScores, UrlOnlyScores};
use super::{risk_percentage, ClassifierResult, ContentScorer, Label, UrlScorer};
use crate::config::Config;
use crate::error::{PhishError, Result};
use crate::features::indicators::find_urls;
use crate::features::{FeatureSchema, UrlIndicators};
use crate::machine_learning::{load_content_model, load_url_model};
use crate::verdict::{
    Classifiers, EmailIndicators, EnsembleVerdict, FullEmailVerdict, SubResult, UrlOnlyVerdict,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsemblePolicy {
    /// Content confidence above which URL evidence is ignored
    pub high_confidence_threshold: f64,
    pub content_weight: f64,
    pub url_weight: f64,
}

impl Default for EnsemblePolicy {
    fn default() -> Self {
        Self {
            high_confidence_threshold: 0.85,
            content_weight: 0.7,
            url_weight: 0.3,
        }
    }
}

impl EnsemblePolicy {
    /// Final label and confidence from one content result and any number of
    /// URL results.
    pub fn combine(
        &self,
        content: &ClassifierResult,
        url_results: &[ClassifierResult],
    ) -> (Label, f64) {
        if content.confidence > self.high_confidence_threshold {
            return (content.prediction, content.confidence);
        }

        if url_results.is_empty() {
            return (content.prediction, content.confidence);
        }

        let avg_url_confidence =
            url_results.iter().map(|r| r.confidence).sum::<f64>() / url_results.len() as f64;
        // One malicious URL is enough
        let url_prediction = if url_results.iter().any(|r| r.prediction.is_phishing()) {
            Label::Phishing
        } else {
            Label::Legitimate
        };

        if content.prediction == url_prediction {
            let confidence = self.content_weight * content.confidence
                + self.url_weight * avg_url_confidence;
            (url_prediction, confidence.clamp(0.0, 1.0))
        } else {
            // Content breaks ties
            (content.prediction, content.confidence)
        }
    }
}

/// URL-only score block. The legitimate branch is deliberately half-weighted
/// and truncated to keep existing consumers' numbers unchanged.
pub fn url_only_score(result: &ClassifierResult) -> u32 {
    if result.prediction.is_phishing() {
        (result.confidence * 100.0) as u32
    } else {
        ((1.0 - result.confidence) * 50.0) as u32
    }
}

/// Owns the loaded scorers for the process lifetime. Read-only after
/// construction, so one instance can serve concurrent requests.
pub struct EnsembleClassifier {
    content: ContentScorer,
    url: UrlScorer,
    policy: EnsemblePolicy,
}

impl EnsembleClassifier {
    pub fn new(content: ContentScorer, url: UrlScorer, policy: EnsemblePolicy) -> Self {
        Self {
            content,
            url,
            policy,
        }
    }

    /// No artifacts at all: unknown content, rule-based URLs
    pub fn rule_based(schema: FeatureSchema) -> Self {
        Self::new(
            ContentScorer::Unavailable,
            UrlScorer::rule_based(schema),
            EnsemblePolicy::default(),
        )
    }

    /// Load whatever artifacts the configuration names. Missing artifacts
    /// degrade; malformed or schema-mismatched ones are errors.
    pub fn from_config(config: &Config) -> Result<Self> {
        let content_model = match config.content_model_path() {
            Some(path) => match load_content_model(&path) {
                Ok(model) => Some(model),
                Err(PhishError::ModelUnavailable(reason)) => {
                    log::warn!("{}; content predictions will be unknown", reason);
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let url_model = match config.url_model_path() {
            Some(path) => match load_url_model(&path) {
                Ok(model) => Some(model),
                Err(PhishError::ModelUnavailable(reason)) => {
                    log::warn!("{}; using rule-based URL scoring", reason);
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let classifier = Self::new(
            ContentScorer::from_model(content_model),
            UrlScorer::from_model(url_model, config.url_schema)?,
            config.ensemble,
        );
        log::info!(
            "Ensemble ready: content {}, url {}",
            classifier.content.describe(),
            classifier.url.describe()
        );
        Ok(classifier)
    }

    pub fn content_scorer(&self) -> &ContentScorer {
        &self.content
    }

    pub fn url_scorer(&self) -> &UrlScorer {
        &self.url
    }

    pub fn policy(&self) -> &EnsemblePolicy {
        &self.policy
    }

    /// Full-email verdict for a body, optional headers and the URLs found in it
    pub fn combine_full_email(
        &self,
        body: &str,
        headers: Option<&HashMap<String, String>>,
        urls: &[String],
    ) -> Result<EnsembleVerdict> {
        if body.trim().is_empty() {
            return Err(PhishError::InvalidInput("No email body provided".to_string()));
        }

        let content_result = self.content.predict(body, headers);
        let url_results: Vec<ClassifierResult> =
            urls.iter().map(|url| self.url.predict(url)).collect();

        let (prediction, confidence) = self.policy.combine(&content_result, &url_results);

        let indicators = self.content.indicators(body, headers);
        let url_indicators: Vec<UrlIndicators> =
            urls.iter().map(|url| self.url.indicators(url)).collect();
        let indicator_scores = IndicatorScores::calculate(&indicators, &url_indicators);

        log::debug!(
            "Full email verdict: {} ({:.3}) from content {} ({:.3}) and {} URL(s)",
            prediction,
            confidence,
            content_result.prediction,
            content_result.confidence,
            url_results.len()
        );

        Ok(EnsembleVerdict::FullEmail(FullEmailVerdict {
            prediction,
            confidence,
            risk_percentage: risk_percentage(prediction, confidence),
            classifiers: Classifiers {
                content_classifier: SubResult::from(&content_result),
                url_classifier: url_results
                    .first()
                    .map(SubResult::from)
                    .unwrap_or_else(SubResult::not_applicable),
            },
            indicators: EmailIndicators {
                suspicious_keywords: indicators.suspicious_keywords,
                suspicious_urls: indicators.detected_urls,
                sender_mismatch: indicators.sender_mismatch,
                url_features: url_indicators.into_iter().next(),
            },
            indicator_scores,
        }))
    }

    /// Full-email verdict scoring every URL found in the body
    pub fn analyze_email(
        &self,
        body: &str,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<EnsembleVerdict> {
        let urls = find_urls(body);
        self.combine_full_email(body, headers, &urls)
    }

    /// Single-URL verdict; the combiner is not involved
    pub fn combine_url_only(&self, url: &str) -> Result<EnsembleVerdict> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PhishError::InvalidInput("No URL provided".to_string()));
        }

        let result = self.url.predict(url);
        let url_features = self.url.indicators(url);

        log::debug!(
            "URL-only verdict for {}: {} ({:.3})",
            url,
            result.prediction,
            result.confidence
        );

        Ok(EnsembleVerdict::UrlOnly(UrlOnlyVerdict {
            prediction: result.prediction,
            confidence: result.confidence,
            risk_percentage: risk_percentage(result.prediction, result.confidence),
            url_features,
            indicator_scores: UrlOnlyScores {
                url_score: url_only_score(&result),
            },
        }))
    }
}
