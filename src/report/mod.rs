pub mod json;
pub mod text;

use serde::Serialize;

use crate::model::decision::FusedDecision;
use crate::model::scores::PositionalScore;
use crate::pipeline::TextChannel;

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool: String,
    pub version: String,
    pub respondent: String,
    pub n_features: usize,
    pub n_answered: usize,
    pub n_scored: usize,
    pub decision: FusedDecision,
    pub advice: String,
    pub text_channel: TextChannel,
    pub missing_baseline_preview: Vec<String>,
    pub missing_baseline_total: usize,
    pub unavailable: Vec<String>,
    pub top: Vec<PositionalScore>,
    pub outliers: Vec<PositionalScore>,
}

#[derive(Debug, Clone)]
pub struct ReportContext {
    pub respondent: String,
    pub decision: FusedDecision,
    pub text_channel: TextChannel,
    /// (display label, score) in ranked order.
    pub top: Vec<(String, PositionalScore)>,
    pub n_ranked: usize,
    pub outliers: Vec<(String, PositionalScore)>,
    pub outlier_abs_z: f64,
    pub missing_baseline: Vec<String>,
    pub missing_preview: usize,
    pub unavailable: Vec<String>,
    pub n_features: usize,
    pub n_answered: usize,
}

/// Six decimals; NaN and infinities are written literally.
pub fn format_f64_6(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", v)
    }
}

/// First `limit` names, with a trailing "..." marker when the list was cut.
pub fn preview_list(names: &[String], limit: usize) -> Vec<String> {
    let mut out: Vec<String> = names.iter().take(limit).cloned().collect();
    if names.len() > limit {
        out.push("...".to_string());
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
