pub mod logistic;
pub mod text;

use crate::model::value::RespondentVector;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("failed to load model {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("incompatible model: {0}")]
    IncompatibleModel(String),
    #[error("malformed value for feature {feature}: {reason}")]
    MalformedValue { feature: String, reason: String },
    #[error("model produced an invalid probability: {0}")]
    NonFiniteProbability(f64),
    #[error("empty text input")]
    EmptyText,
}

/// The behavioral questionnaire model. Must accept `Missing` for any feature.
pub trait BehaviorClassifier {
    fn predict_probability(&self, features: &RespondentVector) -> Result<f64, ClassifierError>;
}

/// The optional free-text model.
pub trait TextClassifier {
    fn predict_probability(&self, text: &str) -> Result<f64, ClassifierError>;
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub(crate) fn checked_probability(p: f64) -> Result<f64, ClassifierError> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(ClassifierError::NonFiniteProbability(p))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/classifier/tests.rs"]
mod tests;
