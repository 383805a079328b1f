use super::{binary_output, default_labels, default_true, load_json, sigmoid};
use super::{ModelOutput, TextModel};
use crate::error::{PhishError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// NLTK English stop word list
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

lazy_static! {
    static ref LINK_TOKEN: Regex = Regex::new(r"http\S+|www\S+").unwrap();
    static ref NON_LETTER: Regex = Regex::new(r"[^a-zA-Z\s]").unwrap();
    static ref STOP_SET: HashSet<&'static str> = STOP_WORDS.iter().copied().collect();
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Normalise body text the way the content artifacts were trained:
/// lower-case, links dropped, letters only, stop words removed, then stemmed.
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_links = LINK_TOKEN.replace_all(&lowered, "");
    let letters_only = NON_LETTER.replace_all(&without_links, "");

    letters_only
        .split_whitespace()
        .filter(|word| !STOP_SET.contains(word))
        .map(|word| STEMMER.stem(word).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// On-disk form of a bag-of-words content classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BagOfWordsArtifact {
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    /// Token weight for the phishing class
    pub vocabulary: HashMap<String, f64>,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default = "default_true")]
    pub reports_probabilities: bool,
}

/// Logistic model over L2-normalised term frequencies of cleaned text
#[derive(Debug, Clone)]
pub struct BagOfWordsModel {
    name: String,
    artifact: BagOfWordsArtifact,
}

impl BagOfWordsModel {
    pub fn from_artifact(name: &str, artifact: BagOfWordsArtifact) -> Result<Self> {
        if artifact.labels.len() != 2 {
            return Err(PhishError::ArtifactFormat(format!(
                "{}: content model needs exactly 2 labels, got {}",
                name,
                artifact.labels.len()
            )));
        }
        if artifact.vocabulary.is_empty() {
            return Err(PhishError::ArtifactFormat(format!(
                "{}: empty vocabulary",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            artifact,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let artifact: BagOfWordsArtifact = load_json(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("content_model");
        Self::from_artifact(name, artifact)
    }

    fn term_frequencies(text: &str) -> HashMap<String, f64> {
        let mut counts: HashMap<String, f64> = HashMap::new();
        for token in clean_text(text).split_whitespace() {
            *counts.entry(token.to_string()).or_insert(0.0) += 1.0;
        }

        let norm = counts.values().map(|c| c * c).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in counts.values_mut() {
                *value /= norm;
            }
        }
        counts
    }
}

impl TextModel for BagOfWordsModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.artifact.labels
    }

    fn score(&self, text: &str) -> Result<ModelOutput> {
        let tf = Self::term_frequencies(text);
        let z = self.artifact.intercept
            + tf
                .iter()
                .filter_map(|(token, weight)| {
                    self.artifact.vocabulary.get(token).map(|w| w * weight)
                })
                .sum::<f64>();

        binary_output(sigmoid(z), self.artifact.reports_probabilities)
    }
}
