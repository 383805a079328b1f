pub mod indicators;
pub mod url_features;

pub use indicators::{IndicatorSet, SenderMismatch, UrlIndicators};
pub use url_features::{UrlFeatureExtractor, UrlFeatures};

use crate::error::{PhishError, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Case-insensitive header lookup utility function
pub fn get_header_case_insensitive<'a>(
    headers: &'a HashMap<String, String>,
    header_name: &str,
) -> Option<&'a String> {
    let header_lower = header_name.to_lowercase();
    headers
        .iter()
        .find(|(k, _)| k.to_lowercase() == header_lower)
        .map(|(_, v)| v)
}

/// Legacy feature set, in the alphabetical order the basic backend was trained on.
pub const BASIC_FEATURES: [&str; 17] = [
    "digit_count",
    "digit_ratio",
    "domain_length",
    "entropy",
    "fragment_present",
    "has_at_symbol",
    "has_double_slash",
    "has_https",
    "has_ip_address",
    "path_depth",
    "path_length",
    "query_params_count",
    "special_char_count",
    "subdomain_count",
    "suspicious_tld",
    "url_length",
    "url_shortener",
];

/// Extended feature set, in extraction order.
pub const ADVANCED_FEATURES: [&str; 25] = [
    "url_length",
    "domain_length",
    "path_length",
    "has_https",
    "has_ip_address",
    "subdomain_count",
    "suspicious_tld",
    "trusted_tld",
    "url_shortener",
    "special_char_count",
    "digit_count",
    "digit_ratio",
    "letter_ratio",
    "has_at_symbol",
    "has_double_slash",
    "has_hyphen_in_domain",
    "consecutive_dots",
    "path_depth",
    "query_params_count",
    "fragment_present",
    "entropy",
    "uppercase_ratio",
    "domain_digit_ratio",
    "suspicious_keywords",
    "vowel_ratio",
];

/// Versioned feature set a URL scoring backend was trained against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSchema {
    Basic,
    #[default]
    Advanced,
}

impl FeatureSchema {
    /// Feature names in the order the backend expects them
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            FeatureSchema::Basic => &BASIC_FEATURES,
            FeatureSchema::Advanced => &ADVANCED_FEATURES,
        }
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }

    pub fn version(&self) -> &'static str {
        match self {
            FeatureSchema::Basic => "basic-v1",
            FeatureSchema::Advanced => "advanced-v2",
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names().contains(&name)
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} features)", self.version(), self.len())
    }
}

/// Ordered, schema-tagged feature values ready for a scoring backend
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn new(schema: FeatureSchema, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), schema.len());
        Self { schema, values }
    }

    pub fn zeroed(schema: FeatureSchema) -> Self {
        Self::new(schema, vec![0.0; schema.len()])
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema
            .names()
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.values[idx])
    }

    /// Value of a 0/1 flag; absent keys read as unset
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).unwrap_or(0.0) != 0.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.schema
            .names()
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Reject a vector built for a different backend
    pub fn ensure_schema(&self, expected: FeatureSchema) -> Result<()> {
        if self.schema != expected {
            return Err(PhishError::SchemaMismatch {
                expected: expected.to_string(),
                actual: self.schema.to_string(),
            });
        }
        Ok(())
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_sizes_and_order() {
        assert_eq!(FeatureSchema::Basic.len(), 17);
        assert_eq!(FeatureSchema::Advanced.len(), 25);

        let mut sorted = BASIC_FEATURES.to_vec();
        sorted.sort();
        assert_eq!(sorted, BASIC_FEATURES.to_vec());

        // Every legacy key also exists in the extended set
        for name in BASIC_FEATURES.iter() {
            assert!(FeatureSchema::Advanced.contains(name), "{}", name);
        }
        assert!(!FeatureSchema::Basic.contains("trusted_tld"));
        assert!(!FeatureSchema::Basic.contains("vowel_ratio"));
    }

    #[test]
    fn test_ensure_schema() {
        let vector = FeatureVector::zeroed(FeatureSchema::Basic);
        assert!(vector.ensure_schema(FeatureSchema::Basic).is_ok());

        match vector.ensure_schema(FeatureSchema::Advanced) {
            Err(PhishError::SchemaMismatch { expected, actual }) => {
                assert!(expected.contains("advanced-v2"));
                assert!(actual.contains("basic-v1"));
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_vector_serializes_in_schema_order() {
        let vector = FeatureVector::zeroed(FeatureSchema::Advanced);
        let json = serde_json::to_string(&vector).unwrap();
        let url_pos = json.find("\"url_length\"").unwrap();
        let vowel_pos = json.find("\"vowel_ratio\"").unwrap();
        assert!(url_pos < vowel_pos);
        assert!(json.starts_with("{\"url_length\":0.0"));
    }

    #[test]
    fn test_header_lookup() {
        let mut headers = HashMap::new();
        headers.insert("Reply-To".to_string(), "a@b.com".to_string());
        assert_eq!(
            get_header_case_insensitive(&headers, "reply-to"),
            Some(&"a@b.com".to_string())
        );
        assert!(get_header_case_insensitive(&headers, "from").is_none());
    }
}
