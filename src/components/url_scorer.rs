use super::{rule_scorer, ClassifierResult};
use crate::error::{PhishError, Result};
use crate::features::indicators::url_indicators;
use crate::features::{FeatureSchema, UrlFeatureExtractor, UrlIndicators};
use crate::machine_learning::{interpret, FeatureModel};

/// Per-URL classifier, either rule-based or backed by a loaded artifact
pub enum UrlScorer {
    RuleBased {
        extractor: UrlFeatureExtractor,
    },
    ModelBacked {
        extractor: UrlFeatureExtractor,
        model: Box<dyn FeatureModel>,
    },
}

impl UrlScorer {
    pub fn rule_based(schema: FeatureSchema) -> Self {
        UrlScorer::RuleBased {
            extractor: UrlFeatureExtractor::new(schema),
        }
    }

    /// Model-backed scorer extracting the artifact's own schema
    pub fn model_backed(model: Box<dyn FeatureModel>) -> Self {
        UrlScorer::ModelBacked {
            extractor: UrlFeatureExtractor::new(model.schema()),
            model,
        }
    }

    /// Pick the variant from artifact availability. The caller declares the
    /// schema it expects; an artifact trained on another one is rejected.
    pub fn from_model(model: Option<Box<dyn FeatureModel>>, schema: FeatureSchema) -> Result<Self> {
        match model {
            Some(model) if model.schema() != schema => Err(PhishError::SchemaMismatch {
                expected: schema.to_string(),
                actual: format!("{} in artifact '{}'", model.schema(), model.name()),
            }),
            Some(model) => Ok(Self::model_backed(model)),
            None => Ok(Self::rule_based(schema)),
        }
    }

    pub fn schema(&self) -> FeatureSchema {
        match self {
            UrlScorer::RuleBased { extractor } | UrlScorer::ModelBacked { extractor, .. } => {
                extractor.schema()
            }
        }
    }

    pub fn is_model_backed(&self) -> bool {
        matches!(self, UrlScorer::ModelBacked { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            UrlScorer::RuleBased { extractor } => format!("rule-based, {}", extractor.schema()),
            UrlScorer::ModelBacked { model, .. } => {
                format!("model '{}', {}", model.name(), model.schema())
            }
        }
    }

    pub fn predict(&self, url: &str) -> ClassifierResult {
        match self {
            UrlScorer::RuleBased { extractor } => rule_scorer::score(&extractor.extract(url)),
            UrlScorer::ModelBacked { extractor, model } => {
                let vector = extractor.extract(url);
                match model
                    .score(&vector)
                    .and_then(|output| interpret(&output, model.labels()))
                {
                    Ok((label, confidence)) => ClassifierResult::new(label, confidence),
                    Err(e) => {
                        log::warn!("URL model '{}' failed on {}: {}", model.name(), url, e);
                        ClassifierResult::unknown()
                    }
                }
            }
        }
    }

    pub fn indicators(&self, url: &str) -> UrlIndicators {
        url_indicators(url, self.schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Label;
    use crate::features::FeatureVector;
    use crate::machine_learning::ModelOutput;

    struct FixedModel {
        schema: FeatureSchema,
        labels: Vec<String>,
        output: Option<ModelOutput>,
    }

    impl FeatureModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }
        fn schema(&self) -> FeatureSchema {
            self.schema
        }
        fn labels(&self) -> &[String] {
            &self.labels
        }
        fn score(&self, features: &FeatureVector) -> Result<ModelOutput> {
            features.ensure_schema(self.schema)?;
            self.output
                .clone()
                .ok_or_else(|| PhishError::Inference("backend crashed".to_string()))
        }
    }

    fn fixed(schema: FeatureSchema, output: Option<ModelOutput>) -> Box<dyn FeatureModel> {
        Box::new(FixedModel {
            schema,
            labels: crate::machine_learning::default_labels(),
            output,
        })
    }

    #[test]
    fn test_rule_based_variant() {
        let scorer = UrlScorer::from_model(None, FeatureSchema::Advanced).unwrap();
        assert!(!scorer.is_model_backed());

        let result = scorer.predict("http://login-verify.tk");
        assert_eq!(result.prediction, Label::Phishing);
        assert!(result.rule_based);
    }

    #[test]
    fn test_model_backed_variant() {
        let model = fixed(
            FeatureSchema::Basic,
            Some(ModelOutput {
                class_index: 1,
                probabilities: Some(vec![0.35, 0.65]),
            }),
        );
        let scorer = UrlScorer::from_model(Some(model), FeatureSchema::Basic).unwrap();
        assert!(scorer.is_model_backed());

        let result = scorer.predict("https://example.com");
        assert_eq!(result.prediction, Label::Phishing);
        assert!((result.confidence - 0.65).abs() < 1e-12);
        assert!(!result.rule_based);
    }

    #[test]
    fn test_inference_failure_degrades_to_unknown() {
        let scorer = UrlScorer::model_backed(fixed(FeatureSchema::Advanced, None));
        let result = scorer.predict("http://prize.tk");
        assert_eq!(result, ClassifierResult::unknown());

        // Indicators do not depend on the model
        let indicators = scorer.indicators("http://prize.tk");
        assert!(indicators.suspicious_tld);
        assert!(indicators.no_https);
    }

    #[test]
    fn test_declared_schema_must_match_artifact() {
        let model = fixed(FeatureSchema::Basic, None);
        assert!(matches!(
            UrlScorer::from_model(Some(model), FeatureSchema::Advanced),
            Err(PhishError::SchemaMismatch { .. })
        ));
    }
}
