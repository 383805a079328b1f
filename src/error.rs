//! Error types for the phishing ensemble

use thiserror::Error;

/// Result type alias for ensemble operations
pub type Result<T> = std::result::Result<T, PhishError>;

#[derive(Error, Debug)]
pub enum PhishError {
    /// No scoring artifact is loaded for this classifier
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// URL could not be parsed into features
    #[error("Feature extraction failed for '{url}': {reason}")]
    FeatureExtraction { url: String, reason: String },

    /// The backing model failed while scoring
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Feature vector and model disagree on the feature set
    #[error("Feature schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    /// Required request input is missing or empty
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Artifact file is readable but not a valid model
    #[error("Invalid model artifact: {0}")]
    ArtifactFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PhishError {
    /// Errors the caller should report as a rejected request
    pub fn is_client_error(&self) -> bool {
        matches!(self, PhishError::InvalidInput(_))
    }
}

impl From<serde_json::Error> for PhishError {
    fn from(e: serde_json::Error) -> Self {
        PhishError::ArtifactFormat(e.to_string())
    }
}
