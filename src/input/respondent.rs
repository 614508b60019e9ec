use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::input::InputError;
use crate::model::baseline::{BaselineSet, FeatureBaseline};
use crate::model::value::{FeatureValue, RespondentVector, is_missing_marker, parse_number};

pub fn load_respondent(
    path: &Path,
    features: &[String],
    baselines: &BaselineSet,
) -> Result<RespondentVector, InputError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| InputError::MissingInput(format!("{}: {e}", path.display())))?;
    parse_respondent(&raw, features, baselines)
}

/// Builds a respondent vector from a JSON object of answers. Strings are read as numbers only
/// where the feature's baseline is numeric; every model feature not answered is `Missing`.
pub fn parse_respondent(
    raw: &str,
    features: &[String],
    baselines: &BaselineSet,
) -> Result<RespondentVector, InputError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(map) = value else {
        return Err(InputError::InvalidInput(
            "respondent answers must be a JSON object".to_string(),
        ));
    };

    let mut supplied = BTreeMap::new();
    for (key, answer) in map {
        if !features.contains(&key) {
            tracing::warn!(feature = %key, "answer for unknown feature ignored");
            continue;
        }
        let baseline = baselines.get(&key);
        let parsed = coerce_answer(&key, &answer, baseline)?;
        check_answer(&key, &parsed, baseline);
        supplied.insert(key, parsed);
    }

    Ok(RespondentVector::new(features, supplied))
}

fn coerce_answer(
    feature: &str,
    answer: &Value,
    baseline: Option<&FeatureBaseline>,
) -> Result<FeatureValue, InputError> {
    let numeric = baseline.is_some_and(FeatureBaseline::is_numeric);
    match answer {
        Value::Null => Ok(FeatureValue::Missing),
        Value::Number(n) => match n.as_f64() {
            Some(v) if numeric || baseline.is_none() => Ok(FeatureValue::Numeric(v)),
            Some(_) => Ok(FeatureValue::Categorical(n.to_string())),
            None => Err(InputError::InvalidInput(format!(
                "answer for {feature} is not representable as a float"
            ))),
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if is_missing_marker(trimmed) {
                return Ok(FeatureValue::Missing);
            }
            if numeric {
                if let Some(v) = parse_number(trimmed) {
                    return Ok(FeatureValue::Numeric(v));
                }
            }
            Ok(FeatureValue::Categorical(trimmed.to_string()))
        }
        Value::Bool(b) => Ok(FeatureValue::Categorical(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err(InputError::InvalidInput(format!(
            "answer for {feature} must be a number, string or null"
        ))),
    }
}

fn check_answer(feature: &str, value: &FeatureValue, baseline: Option<&FeatureBaseline>) {
    match (value, baseline) {
        (FeatureValue::Numeric(v), Some(FeatureBaseline::Numeric(b))) => {
            if !b.bounds.contains(*v) {
                tracing::warn!(
                    feature,
                    value = *v,
                    min = b.bounds.slider_min,
                    max = b.bounds.slider_max,
                    "answer outside the reference range"
                );
            }
        }
        (FeatureValue::Categorical(s), Some(FeatureBaseline::Categorical(b))) => {
            if !b.contains(s) {
                tracing::warn!(feature, value = %s, "answer not among observed reference choices");
            }
        }
        (FeatureValue::Categorical(s), Some(FeatureBaseline::Numeric(_))) => {
            tracing::warn!(feature, value = %s, "non-numeric answer for a numeric feature");
        }
        _ => {}
    }
}
