use super::{binary_output, default_labels, default_true, load_json, sigmoid};
use super::{FeatureModel, ModelOutput};
use crate::error::{PhishError, Result};
use crate::features::{FeatureSchema, FeatureVector};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk form of a logistic URL classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticArtifact {
    pub schema: FeatureSchema,
    /// Trained column order; must match the schema exactly
    pub feature_names: Vec<String>,
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default = "default_true")]
    pub reports_probabilities: bool,
}

/// Logistic regression over a URL feature vector
#[derive(Debug, Clone)]
pub struct LogisticUrlModel {
    name: String,
    artifact: LogisticArtifact,
}

impl LogisticUrlModel {
    pub fn from_artifact(name: &str, artifact: LogisticArtifact) -> Result<Self> {
        let expected = artifact.schema.names();
        if artifact.feature_names.len() != expected.len()
            || artifact
                .feature_names
                .iter()
                .zip(expected.iter())
                .any(|(have, want)| have != want)
        {
            return Err(PhishError::SchemaMismatch {
                expected: format!("{} [{}]", artifact.schema, expected.join(",")),
                actual: format!("[{}]", artifact.feature_names.join(",")),
            });
        }

        if artifact.weights.len() != expected.len() {
            return Err(PhishError::ArtifactFormat(format!(
                "{}: {} weights for {} features",
                name,
                artifact.weights.len(),
                expected.len()
            )));
        }

        if artifact.labels.len() != 2 {
            return Err(PhishError::ArtifactFormat(format!(
                "{}: logistic model needs exactly 2 labels, got {}",
                name,
                artifact.labels.len()
            )));
        }

        Ok(Self {
            name: name.to_string(),
            artifact,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let artifact: LogisticArtifact = load_json(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("url_model");
        Self::from_artifact(name, artifact)
    }
}

impl FeatureModel for LogisticUrlModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> FeatureSchema {
        self.artifact.schema
    }

    fn labels(&self) -> &[String] {
        &self.artifact.labels
    }

    fn score(&self, features: &FeatureVector) -> Result<ModelOutput> {
        features.ensure_schema(self.artifact.schema)?;

        let z = self.artifact.intercept
            + features
                .values()
                .iter()
                .zip(self.artifact.weights.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>();

        binary_output(sigmoid(z), self.artifact.reports_probabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::UrlFeatureExtractor;
    use std::io::Write;

    fn artifact(schema: FeatureSchema) -> LogisticArtifact {
        let names = schema.names();
        let weights = names
            .iter()
            .map(|n| match *n {
                "suspicious_tld" => 4.0,
                "has_ip_address" => 4.0,
                "has_https" => -2.0,
                _ => 0.0,
            })
            .collect();
        LogisticArtifact {
            schema,
            feature_names: names.iter().map(|s| s.to_string()).collect(),
            labels: default_labels(),
            weights,
            intercept: -1.0,
            reports_probabilities: true,
        }
    }

    #[test]
    fn test_scores_feature_vector() {
        let model =
            LogisticUrlModel::from_artifact("test", artifact(FeatureSchema::Advanced)).unwrap();
        let extractor = UrlFeatureExtractor::new(FeatureSchema::Advanced);

        let bad = model.score(&extractor.extract("http://free-gift.tk/")).unwrap();
        assert_eq!(bad.class_index, 1);
        let probs = bad.probabilities.unwrap();
        assert!((probs[1] - sigmoid(3.0)).abs() < 1e-12);

        let good = model.score(&extractor.extract("https://example.com/")).unwrap();
        assert_eq!(good.class_index, 0);
    }

    #[test]
    fn test_rejects_reordered_features() {
        let mut art = artifact(FeatureSchema::Basic);
        art.feature_names.swap(0, 1);
        match LogisticUrlModel::from_artifact("test", art) {
            Err(PhishError::SchemaMismatch { .. }) => {}
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_truncated_feature_set() {
        let mut art = artifact(FeatureSchema::Advanced);
        art.feature_names.pop();
        assert!(matches!(
            LogisticUrlModel::from_artifact("test", art),
            Err(PhishError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_vector_of_other_schema() {
        let model = LogisticUrlModel::from_artifact("test", artifact(FeatureSchema::Basic)).unwrap();
        let vector = UrlFeatureExtractor::new(FeatureSchema::Advanced).extract("http://a.com");
        assert!(matches!(
            model.score(&vector),
            Err(PhishError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&artifact(FeatureSchema::Basic)).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let model = LogisticUrlModel::load(file.path()).unwrap();
        assert_eq!(model.schema(), FeatureSchema::Basic);
        assert_eq!(model.labels().len(), 2);

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        broken.write_all(b"{\"schema\": \"basic\"").unwrap();
        assert!(matches!(
            LogisticUrlModel::load(broken.path()),
            Err(PhishError::ArtifactFormat(_))
        ));
    }
}
