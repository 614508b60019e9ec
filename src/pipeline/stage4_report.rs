use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::model::baseline::BaselineSet;
use crate::model::decision::FusedDecision;
use crate::model::labels::QuestionLabels;
use crate::model::scores::PositionalScore;
use crate::model::thresholds::DecisionProfile;
use crate::pipeline::TextChannel;
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{ReportContext, SummaryData, format_f64_6, preview_list};

pub const EXPORT_COLUMNS: [&str; 6] = ["feature", "value", "mean", "std", "z", "percentile"];

#[derive(Debug, Clone, Default)]
pub struct DeviationReport {
    pub ranked: Vec<PositionalScore>,
    pub outliers: Vec<PositionalScore>,
}

/// Ranks by descending |z|, NaN z last; outliers are ranked rows with |z| at or above the cut.
pub fn assemble(scores: &[PositionalScore], outlier_abs_z: f64) -> DeviationReport {
    let mut ranked: Vec<PositionalScore> = scores
        .iter()
        .filter(|s| s.value.is_finite())
        .cloned()
        .collect();
    ranked.sort_by(compare_abs_z_desc);

    let outliers = ranked
        .iter()
        .filter(|s| !s.z.is_nan() && s.abs_z() >= outlier_abs_z)
        .cloned()
        .collect();

    DeviationReport { ranked, outliers }
}

fn compare_abs_z_desc(a: &PositionalScore, b: &PositionalScore) -> Ordering {
    match (a.z.is_nan(), b.z.is_nan()) {
        (false, false) => b.abs_z().total_cmp(&a.abs_z()),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    }
}

pub fn write_scores_csv<W: Write>(w: &mut W, scores: &[PositionalScore]) -> std::io::Result<()> {
    writeln!(w, "{}", EXPORT_COLUMNS.join(","))?;
    for s in scores {
        let row = [
            csv_field(&s.feature),
            format_f64_6(s.value),
            format_f64_6(s.mean),
            format_f64_6(s.std),
            format_f64_6(s.z),
            format_f64_6(s.percentile),
        ]
        .join(",");
        writeln!(w, "{}", row)?;
    }
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Stage4Input<'a> {
    pub respondent_id: String,
    pub n_features: usize,
    pub n_answered: usize,
    pub decision: &'a FusedDecision,
    pub text_channel: &'a TextChannel,
    pub report: &'a DeviationReport,
    pub baselines: &'a BaselineSet,
    pub labels: &'a QuestionLabels,
    pub profile: &'a DecisionProfile,
    pub tool_name: String,
    pub tool_version: String,
}

#[derive(Debug, Clone)]
pub struct WrittenReports {
    pub deviation_csv: PathBuf,
    pub outliers_csv: PathBuf,
    pub summary_json: PathBuf,
    pub report_txt: PathBuf,
}

pub fn write_reports(input: &Stage4Input<'_>, out_dir: &Path) -> std::io::Result<WrittenReports> {
    fs::create_dir_all(out_dir)?;

    let deviation_csv = out_dir.join("deviation_report.csv");
    let mut w = BufWriter::new(File::create(&deviation_csv)?);
    write_scores_csv(&mut w, &input.report.ranked)?;
    w.flush()?;

    let outliers_csv = out_dir.join("outliers.csv");
    let mut w = BufWriter::new(File::create(&outliers_csv)?);
    write_scores_csv(&mut w, &input.report.outliers)?;
    w.flush()?;

    let summary = build_summary(input);
    let summary_json = out_dir.join("summary.json");
    write_text(&summary_json, &render_summary_json(&summary)?)?;

    let report_txt = out_dir.join("report.txt");
    let ctx = build_report_context(input);
    write_text(&report_txt, &render_report_text(&ctx))?;

    Ok(WrittenReports {
        deviation_csv,
        outliers_csv,
        summary_json,
        report_txt,
    })
}

pub fn build_summary(input: &Stage4Input<'_>) -> SummaryData {
    let top_k = input.profile.top_k.min(input.report.ranked.len());
    SummaryData {
        tool: input.tool_name.clone(),
        version: input.tool_version.clone(),
        respondent: input.respondent_id.clone(),
        n_features: input.n_features,
        n_answered: input.n_answered,
        n_scored: input.report.ranked.len(),
        decision: input.decision.clone(),
        advice: input.decision.tier.advice().to_string(),
        text_channel: input.text_channel.clone(),
        missing_baseline_preview: preview_list(
            &input.baselines.missing,
            input.profile.missing_preview,
        ),
        missing_baseline_total: input.baselines.missing.len(),
        unavailable: input.baselines.unavailable.clone(),
        top: input.report.ranked[..top_k].to_vec(),
        outliers: input.report.outliers.clone(),
    }
}

fn build_report_context(input: &Stage4Input<'_>) -> ReportContext {
    let top_k = input.profile.top_k.min(input.report.ranked.len());
    let label_rows = |rows: &[PositionalScore]| {
        rows.iter()
            .map(|s| (input.labels.label_for(&s.feature), s.clone()))
            .collect::<Vec<_>>()
    };
    ReportContext {
        respondent: input.respondent_id.clone(),
        decision: input.decision.clone(),
        text_channel: input.text_channel.clone(),
        top: label_rows(&input.report.ranked[..top_k]),
        n_ranked: input.report.ranked.len(),
        outliers: label_rows(&input.report.outliers),
        outlier_abs_z: input.profile.outlier_abs_z,
        missing_baseline: input.baselines.missing.clone(),
        missing_preview: input.profile.missing_preview,
        unavailable: input.baselines.unavailable.clone(),
        n_features: input.n_features,
        n_answered: input.n_answered,
    }
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    f.write_all(contents.as_bytes())?;
    f.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_report.rs"]
mod tests;
