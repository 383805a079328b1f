pub mod components;
pub mod config;
pub mod domain_utils;
pub mod error;
pub mod features;
pub mod machine_learning;
pub mod verdict;

pub use components::{ClassifierResult, EnsembleClassifier, EnsemblePolicy, Label};
pub use config::Config;
pub use error::{PhishError, Result};
pub use features::{FeatureSchema, FeatureVector, UrlFeatureExtractor};
pub use verdict::{EnsembleVerdict, LegacyVerdict};
