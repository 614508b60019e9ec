use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::classifier::{BehaviorClassifier, ClassifierError, checked_probability, sigmoid};
use crate::model::value::{FeatureValue, RespondentVector, parse_number};

#[derive(Debug, Clone, Deserialize)]
pub struct NumericTerm {
    pub weight: f64,
    /// Imputation value for missing answers; the term is centred on it.
    #[serde(default)]
    pub center: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

/// Linear-logistic behavioral model stored as JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    pub intercept: f64,
    #[serde(default)]
    pub numeric: BTreeMap<String, NumericTerm>,
    /// feature -> category -> weight; unseen or missing categories contribute nothing.
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LogisticModel {
    pub fn load(path: &Path, features: &[String]) -> Result<Self, ClassifierError> {
        let raw = fs::read_to_string(path).map_err(|e| ClassifierError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let model: LogisticModel =
            serde_json::from_str(&raw).map_err(|e| ClassifierError::Load {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        model.check_features(features)?;
        Ok(model)
    }

    /// Every term must reference a feature the metadata declares, and scales must be usable.
    pub fn check_features(&self, features: &[String]) -> Result<(), ClassifierError> {
        let declared = |name: &String| features.contains(name);
        if let Some(name) = self
            .numeric
            .keys()
            .chain(self.categorical.keys())
            .find(|name| !declared(name))
        {
            return Err(ClassifierError::IncompatibleModel(format!(
                "model term {name} is not in the metadata feature list"
            )));
        }
        for (name, term) in &self.numeric {
            if !term.scale.is_finite() || term.scale == 0.0 {
                return Err(ClassifierError::IncompatibleModel(format!(
                    "numeric term {name} has unusable scale {}",
                    term.scale
                )));
            }
        }
        Ok(())
    }

    fn numeric_contribution(
        name: &str,
        term: &NumericTerm,
        value: &FeatureValue,
    ) -> Result<f64, ClassifierError> {
        let x = match value {
            FeatureValue::Missing => return Ok(0.0),
            FeatureValue::Numeric(v) if v.is_finite() => *v,
            FeatureValue::Numeric(_) => return Ok(0.0),
            FeatureValue::Categorical(s) => {
                parse_number(s).ok_or_else(|| ClassifierError::MalformedValue {
                    feature: name.to_string(),
                    reason: format!("expected a number, got {s:?}"),
                })?
            }
        };
        Ok(term.weight * (x - term.center) / term.scale)
    }
}

impl BehaviorClassifier for LogisticModel {
    fn predict_probability(&self, features: &RespondentVector) -> Result<f64, ClassifierError> {
        let mut logit = self.intercept;
        for (name, term) in &self.numeric {
            logit += Self::numeric_contribution(name, term, features.get(name))?;
        }
        for (name, weights) in &self.categorical {
            let key = match features.get(name) {
                FeatureValue::Categorical(s) => Some(s.clone()),
                FeatureValue::Numeric(v) if v.is_finite() => Some(format_category(*v)),
                _ => None,
            };
            if let Some(w) = key.and_then(|k| weights.get(&k)) {
                logit += w;
            }
        }
        checked_probability(sigmoid(logit))
    }
}

/// Whole numbers match integer-coded categories ("2", not "2.0").
fn format_category(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}
