use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::classifier::{ClassifierError, TextClassifier, checked_probability, sigmoid};

#[derive(Debug, Clone, Deserialize)]
pub struct VocabEntry {
    pub weight: f64,
    #[serde(default = "unit_idf")]
    pub idf: f64,
}

fn unit_idf() -> f64 {
    1.0
}

/// TF-IDF + logistic regression over a fixed vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct TextLogisticModel {
    pub intercept: f64,
    pub vocabulary: BTreeMap<String, VocabEntry>,
}

impl TextLogisticModel {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let load_err = |reason: String| ClassifierError::Load {
            path: path.display().to_string(),
            reason,
        };
        let raw = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let model: TextLogisticModel =
            serde_json::from_str(&raw).map_err(|e| load_err(e.to_string()))?;
        if model.vocabulary.is_empty() {
            return Err(load_err("vocabulary is empty".to_string()));
        }
        Ok(model)
    }
}

impl TextClassifier for TextLogisticModel {
    fn predict_probability(&self, text: &str) -> Result<f64, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::EmptyText);
        }

        let mut counts: BTreeMap<String, f64> = BTreeMap::new();
        for token in tokenize(text) {
            if self.vocabulary.contains_key(&token) {
                *counts.entry(token).or_insert(0.0) += 1.0;
            }
        }

        let mut weighted = Vec::with_capacity(counts.len());
        let mut norm = 0.0f64;
        for (token, tf) in &counts {
            let entry = &self.vocabulary[token];
            let v = tf * entry.idf;
            norm += v * v;
            weighted.push((v, entry.weight));
        }
        let norm = norm.sqrt();

        let mut logit = self.intercept;
        if norm > 0.0 {
            for (v, w) in weighted {
                logit += (v / norm) * w;
            }
        }
        checked_probability(sigmoid(logit))
    }
}

/// Lowercased alphanumeric words; CJK characters are emitted as single-character tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for ch in text.chars() {
        if is_cjk(ch) {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            tokens.push(ch.to_string());
        } else if ch.is_alphanumeric() {
            word.extend(ch.to_lowercase());
        } else if !word.is_empty() {
            tokens.push(std::mem::take(&mut word));
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

fn is_cjk(ch: char) -> bool {
    matches!(ch as u32,
        0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x3040..=0x30FF | 0xAC00..=0xD7AF)
}
