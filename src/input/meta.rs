use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::input::InputError;
use crate::model::labels::QuestionLabels;

/// Classifier metadata: the ordered feature list the behavioral model consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelMeta {
    pub features: Vec<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl ModelMeta {
    pub fn question_labels(&self) -> QuestionLabels {
        QuestionLabels::new(self.labels.clone())
    }
}

pub fn load_model_meta(path: &Path) -> Result<ModelMeta, InputError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| InputError::MissingInput(format!("{}: {e}", path.display())))?;
    parse_model_meta(&raw)
}

pub fn parse_model_meta(raw: &str) -> Result<ModelMeta, InputError> {
    let mut meta: ModelMeta = serde_json::from_str(raw)?;

    let mut seen = Vec::with_capacity(meta.features.len());
    for name in meta.features.drain(..) {
        let name = name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        if seen.contains(&name) {
            tracing::warn!(feature = %name, "duplicate feature in model metadata; keeping first");
            continue;
        }
        seen.push(name);
    }
    if seen.is_empty() {
        return Err(InputError::InvalidInput(
            "model metadata lists no features".to_string(),
        ));
    }
    meta.features = seen;
    Ok(meta)
}
