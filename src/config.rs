use crate::components::EnsemblePolicy;
use crate::features::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the artifact file names below are resolved against
    pub model_dir: String,
    /// Content classifier artifact; `None` runs without one
    pub content_model: Option<String>,
    /// URL classifier artifact; `None` uses the rule-based scorer
    pub url_model: Option<String>,
    /// Feature set expected from the URL artifact
    pub url_schema: FeatureSchema,
    pub ensemble: EnsemblePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model_dir: "models".to_string(),
            content_model: Some("content_classifier.json".to_string()),
            url_model: Some("url_classifier_advanced.json".to_string()),
            url_schema: FeatureSchema::Advanced,
            ensemble: EnsemblePolicy::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let policy = &self.ensemble;
        let threshold = policy.high_confidence_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!(
                "ensemble.high_confidence_threshold must be within 0..1, got {}",
                threshold
            );
        }
        for (name, weight) in [
            ("content_weight", policy.content_weight),
            ("url_weight", policy.url_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                anyhow::bail!("ensemble.{} must be a non-negative number, got {}", name, weight);
            }
        }
        if policy.content_weight + policy.url_weight > 1.0 + f64::EPSILON {
            anyhow::bail!(
                "ensemble weights must sum to at most 1, got {}",
                policy.content_weight + policy.url_weight
            );
        }
        Ok(())
    }

    fn resolve(&self, name: &Option<String>) -> Option<PathBuf> {
        name.as_ref()
            .filter(|n| !n.trim().is_empty())
            .map(|n| PathBuf::from(&self.model_dir).join(n))
    }

    pub fn content_model_path(&self) -> Option<PathBuf> {
        self.resolve(&self.content_model)
    }

    pub fn url_model_path(&self) -> Option<PathBuf> {
        self.resolve(&self.url_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(
            config.url_model_path(),
            Some(PathBuf::from("models/url_classifier_advanced.json"))
        );
        assert_eq!(
            config.content_model_path(),
            Some(PathBuf::from("models/content_classifier.json"))
        );
        assert_eq!(config.ensemble.high_confidence_threshold, 0.85);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phish.yaml");
        std::fs::write(
            &path,
            "model_dir: /srv/models\nurl_schema: basic\nurl_model: url_classifier.json\ncontent_model: null\nensemble:\n  url_weight: 0.2\n",
        )
        .unwrap();

        let config = Config::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.url_schema, FeatureSchema::Basic);
        assert_eq!(
            config.url_model_path(),
            Some(PathBuf::from("/srv/models/url_classifier.json"))
        );
        assert_eq!(config.content_model_path(), None);
        assert_eq!(config.ensemble.url_weight, 0.2);
        assert_eq!(config.ensemble.content_weight, 0.7);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated.yaml");
        let path = path.to_str().unwrap();

        Config::default().to_file(path).unwrap();
        assert_eq!(Config::from_file(path).unwrap(), Config::default());
    }

    #[test]
    fn test_rejects_weights_above_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heavy.yaml");
        std::fs::write(&path, "ensemble:\n  content_weight: 1.0\n  url_weight: 1.0\n").unwrap();
        assert!(Config::from_file(path.to_str().unwrap()).is_err());

        std::fs::write(&path, "ensemble:\n  content_weight: 0.6\n  url_weight: 0.4\n").unwrap();
        assert!(Config::from_file(path.to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let mut config = Config::default();
        config.ensemble.url_weight = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ensemble.high_confidence_threshold = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ensemble.content_weight = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "ensemble:\n  high_confidence_threshold: 1.5\n").unwrap();
        assert!(Config::from_file(path.to_str().unwrap()).is_err());
    }
}
