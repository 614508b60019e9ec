use std::path::{Path, PathBuf};

use crate::classifier::text::TextLogisticModel;
use crate::classifier::{BehaviorClassifier, TextClassifier};
use crate::model::baseline::BaselineSet;
use crate::model::decision::FusedDecision;
use crate::model::thresholds::DecisionProfile;
use crate::model::value::RespondentVector;
use crate::pipeline::stage2_position::score_respondent;
use crate::pipeline::stage3_fusion::fuse;
use crate::pipeline::stage4_report::{DeviationReport, assemble};
use crate::pipeline::{ScoringError, TextChannel};

/// The optional text model as resolved for a session.
pub enum TextModelState {
    NotConfigured,
    Unresolved(PathBuf),
    LoadFailed(String),
    Ready(Box<dyn TextClassifier>),
}

impl TextModelState {
    /// A missing file or an unloadable model degrades to a recorded state, never an error.
    pub fn resolve(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return TextModelState::NotConfigured;
        };
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "text model not found; using behavior-only scoring");
            return TextModelState::Unresolved(path.to_path_buf());
        }
        match TextLogisticModel::load(path) {
            Ok(model) => {
                tracing::info!(
                    path = %path.display(),
                    vocabulary = model.vocabulary.len(),
                    "loaded text model"
                );
                TextModelState::Ready(Box::new(model))
            }
            Err(err) => {
                tracing::warn!(%err, "text model unavailable; using behavior-only scoring");
                TextModelState::LoadFailed(err.to_string())
            }
        }
    }
}

pub fn run_text_channel(state: &TextModelState, text: Option<&str>) -> TextChannel {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return TextChannel::NoText;
    };
    match state {
        TextModelState::NotConfigured => TextChannel::NoModel,
        TextModelState::Unresolved(path) => TextChannel::Unresolved {
            path: path.display().to_string(),
        },
        TextModelState::LoadFailed(reason) => TextChannel::LoadFailed {
            reason: reason.clone(),
        },
        TextModelState::Ready(model) => match model.predict_probability(text) {
            Ok(probability) => TextChannel::Used { probability },
            Err(err) => {
                tracing::warn!(%err, "text inference failed; using behavior-only scoring");
                TextChannel::InferenceFailed {
                    reason: err.to_string(),
                }
            }
        },
    }
}

pub struct Submission<'a> {
    pub respondent: &'a RespondentVector,
    pub text: Option<&'a str>,
    pub weight_behavior: f64,
}

#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub decision: FusedDecision,
    pub text_channel: TextChannel,
    pub report: DeviationReport,
}

/// One request end to end. A behavioral model failure aborts with no partial decision;
/// every text-side failure degrades to behavior-only fusion.
pub fn score_submission(
    baselines: &BaselineSet,
    behavior: &dyn BehaviorClassifier,
    text_model: &TextModelState,
    submission: &Submission<'_>,
    profile: &DecisionProfile,
) -> Result<SubmissionResult, ScoringError> {
    let p_behavior = behavior
        .predict_probability(submission.respondent)
        .map_err(|err| {
            tracing::error!(%err, "behavioral probability computation failed");
            ScoringError::Behavior(err)
        })?;

    let text_channel = run_text_channel(text_model, submission.text);
    let decision = fuse(
        p_behavior,
        text_channel.probability(),
        submission.weight_behavior,
        profile,
    );

    let scores = score_respondent(baselines, submission.respondent);
    let report = assemble(&scores, profile.outlier_abs_z);

    tracing::info!(
        behavior = decision.behavior_probability,
        fused = decision.fused_probability,
        tier = decision.tier.name(),
        text = decision.used_text(),
        scored = report.ranked.len(),
        outliers = report.outliers.len(),
        "scored submission"
    );

    Ok(SubmissionResult {
        decision,
        text_channel,
        report,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/submission.rs"]
mod tests;
