pub mod session;
pub mod stage1_baseline;
pub mod stage2_position;
pub mod stage3_fusion;
pub mod stage4_report;
pub mod submission;

use serde::Serialize;

use crate::classifier::ClassifierError;
use crate::input::InputError;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("behavioral probability computation failed: {0}")]
    Behavior(#[source] ClassifierError),
}

/// What happened to the optional free-text channel for one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TextChannel {
    Used { probability: f64 },
    NoText,
    NoModel,
    Unresolved { path: String },
    LoadFailed { reason: String },
    InferenceFailed { reason: String },
}

impl TextChannel {
    pub fn probability(&self) -> Option<f64> {
        match self {
            TextChannel::Used { probability } => Some(*probability),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            TextChannel::Used { probability } => format!("text probability {probability:.3}"),
            TextChannel::NoText => "no text supplied".to_string(),
            TextChannel::NoModel => "no text model configured".to_string(),
            TextChannel::Unresolved { path } => format!("text model not found at {path}"),
            TextChannel::LoadFailed { reason } => format!("text model failed to load: {reason}"),
            TextChannel::InferenceFailed { reason } => {
                format!("text model inference failed: {reason}")
            }
        }
    }
}
