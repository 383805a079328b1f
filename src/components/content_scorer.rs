use super::ClassifierResult;
use crate::features::indicators::extract_indicators;
use crate::features::IndicatorSet;
use crate::machine_learning::{interpret, TextModel};
use std::collections::HashMap;

/// Email body classifier. There is no rule path for content: without an
/// artifact the prediction is the unknown sentinel.
pub enum ContentScorer {
    Unavailable,
    ModelBacked { model: Box<dyn TextModel> },
}

impl ContentScorer {
    pub fn from_model(model: Option<Box<dyn TextModel>>) -> Self {
        match model {
            Some(model) => ContentScorer::ModelBacked { model },
            None => ContentScorer::Unavailable,
        }
    }

    pub fn is_model_backed(&self) -> bool {
        matches!(self, ContentScorer::ModelBacked { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            ContentScorer::Unavailable => "unavailable".to_string(),
            ContentScorer::ModelBacked { model } => format!("model '{}'", model.name()),
        }
    }

    pub fn predict(&self, body: &str, _headers: Option<&HashMap<String, String>>) -> ClassifierResult {
        match self {
            ContentScorer::Unavailable => {
                log::debug!("No content model loaded; content prediction unknown");
                ClassifierResult::unknown()
            }
            ContentScorer::ModelBacked { model } => match model
                .score(body)
                .and_then(|output| interpret(&output, model.labels()))
            {
                Ok((label, confidence)) => ClassifierResult::new(label, confidence),
                Err(e) => {
                    log::warn!("Content model '{}' failed: {}", model.name(), e);
                    ClassifierResult::unknown()
                }
            },
        }
    }

    pub fn indicators(&self, body: &str, headers: Option<&HashMap<String, String>>) -> IndicatorSet {
        extract_indicators(body, headers)
    }
}
