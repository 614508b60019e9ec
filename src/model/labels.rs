use std::collections::BTreeMap;

/// Human-readable question text per feature code, e.g. `Q30 -> "days bullied in the past 30 days"`.
#[derive(Debug, Clone, Default)]
pub struct QuestionLabels {
    labels: BTreeMap<String, String>,
}

impl QuestionLabels {
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }

    pub fn label_for(&self, feature: &str) -> String {
        match self.labels.get(feature) {
            Some(text) if !text.trim().is_empty() => format!("{} ({})", text.trim(), feature),
            _ => feature.to_string(),
        }
    }
}
