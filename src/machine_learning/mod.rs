//! Scoring artifacts produced by the external training pipeline.
//!
//! The ensemble only sees two capabilities: a [`FeatureModel`] that scores a
//! URL feature vector and a [`TextModel`] that scores email text. Each returns
//! a [`ModelOutput`] (class index plus optional probabilities), which
//! [`interpret`] maps onto the fixed phishing/legitimate label set.

pub mod linear;
pub mod text;

pub use linear::{LogisticArtifact, LogisticUrlModel};
pub use text::{clean_text, BagOfWordsArtifact, BagOfWordsModel};

use crate::components::Label;
use crate::error::{PhishError, Result};
use crate::features::{FeatureSchema, FeatureVector};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Raw output of a scoring backend
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub class_index: usize,
    /// Per-class probabilities, when the backend reports them
    pub probabilities: Option<Vec<f64>>,
}

pub trait FeatureModel: Send + Sync {
    fn name(&self) -> &str;
    /// Feature set the artifact was trained on
    fn schema(&self) -> FeatureSchema;
    fn labels(&self) -> &[String];
    fn score(&self, features: &FeatureVector) -> Result<ModelOutput>;
}

pub trait TextModel: Send + Sync {
    fn name(&self) -> &str;
    fn labels(&self) -> &[String];
    fn score(&self, text: &str) -> Result<ModelOutput>;
}

pub fn default_labels() -> Vec<String> {
    vec!["legitimate".to_string(), "phishing".to_string()]
}

pub(crate) fn default_true() -> bool {
    true
}

/// Fixed label map from artifact class names to verdict labels
pub fn map_label(raw: &str) -> Label {
    match raw.trim().to_lowercase().as_str() {
        "phishing" | "1" => Label::Phishing,
        "legitimate" | "0" => Label::Legitimate,
        _ => Label::Unknown,
    }
}

/// Turn backend output into a label and confidence.
///
/// With probabilities, confidence is the phishing-class probability for a
/// phishing label and its complement for a legitimate one. A hard label puts
/// all probability mass on the predicted class.
pub fn interpret(output: &ModelOutput, labels: &[String]) -> Result<(Label, f64)> {
    let label = labels
        .get(output.class_index)
        .map(|l| map_label(l))
        .unwrap_or(Label::Unknown);

    let confidence = match &output.probabilities {
        Some(probs) => {
            if probs.len() != labels.len() {
                return Err(PhishError::Inference(format!(
                    "model reported {} probabilities for {} classes",
                    probs.len(),
                    labels.len()
                )));
            }
            let phishing_idx = labels.iter().position(|l| map_label(l) == Label::Phishing);
            match (label, phishing_idx) {
                (Label::Phishing, Some(idx)) => probs[idx],
                (Label::Legitimate, Some(idx)) => 1.0 - probs[idx],
                _ => probs.get(output.class_index).copied().unwrap_or(0.0),
            }
        }
        None => 1.0,
    };

    if !confidence.is_finite() {
        return Err(PhishError::Inference(format!(
            "non-finite confidence {}",
            confidence
        )));
    }

    Ok((label, confidence.clamp(0.0, 1.0)))
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Binary logistic output: class 1 wins at p >= 0.5
pub(crate) fn binary_output(p: f64, reports_probabilities: bool) -> Result<ModelOutput> {
    if !p.is_finite() {
        return Err(PhishError::Inference(format!("non-finite score {}", p)));
    }
    Ok(ModelOutput {
        class_index: usize::from(p >= 0.5),
        probabilities: reports_probabilities.then(|| vec![1.0 - p, p]),
    })
}

pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a URL artifact. A missing file is `ModelUnavailable`; a present
/// but invalid one is a hard error.
pub fn load_url_model(path: &Path) -> Result<Box<dyn FeatureModel>> {
    if !path.exists() {
        return Err(PhishError::ModelUnavailable(format!(
            "URL model not found at {}",
            path.display()
        )));
    }
    let model = LogisticUrlModel::load(path)?;
    log::info!(
        "Loaded URL classifier '{}' ({})",
        model.name(),
        model.schema()
    );
    Ok(Box::new(model))
}

pub fn load_content_model(path: &Path) -> Result<Box<dyn TextModel>> {
    if !path.exists() {
        return Err(PhishError::ModelUnavailable(format!(
            "content model not found at {}",
            path.display()
        )));
    }
    let model = BagOfWordsModel::load(path)?;
    log::info!("Loaded content classifier '{}'", model.name());
    Ok(Box::new(model))
}
