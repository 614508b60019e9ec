use crate::model::scores::PositionalScore;
use crate::pipeline::stage3_fusion::fusion_caption;
use crate::report::{ReportContext, format_f64_6, preview_list};

pub fn render_report_text(ctx: &ReportContext) -> String {
    let mut out = String::new();

    out.push_str("Questionnaire Risk Screening Report\n");
    out.push_str("===================================\n\n");
    out.push_str(&format!("Respondent: {}\n", ctx.respondent));
    out.push_str(&format!(
        "Answered features: {} of {}\n\n",
        ctx.n_answered, ctx.n_features
    ));

    out.push_str("1. Overall risk\n");
    out.push_str(&format!(
        "Fused probability: {:.1}%\n",
        ctx.decision.fused_probability * 100.0
    ));
    out.push_str(&format!("Tier: {}\n", ctx.decision.tier.name().to_uppercase()));
    out.push_str(&format!("Verdict: {}\n", ctx.decision.tier.advice()));
    out.push_str(&format!("{}\n", fusion_caption(&ctx.decision)));
    out.push_str(&format!("Text channel: {}\n\n", ctx.text_channel.describe()));

    out.push_str(&format!(
        "2. Largest deviations from the reference population (top {} of {} by |z|)\n",
        ctx.top.len(),
        ctx.n_ranked
    ));
    if ctx.top.is_empty() {
        out.push_str("No numeric features could be scored (all answers missing or categorical).\n");
    } else {
        for (label, s) in &ctx.top {
            out.push_str(&score_line(label, s));
        }
    }
    out.push('\n');

    out.push_str(&format!(
        "3. Outlier indicators (|z| >= {})\n",
        ctx.outlier_abs_z
    ));
    if ctx.outliers.is_empty() {
        out.push_str(&format!(
            "No indicator with |z| >= {} found.\n",
            ctx.outlier_abs_z
        ));
    } else {
        for (label, s) in &ctx.outliers {
            out.push_str(&score_line(label, s));
        }
    }
    out.push('\n');

    out.push_str("4. Data quality\n");
    if ctx.missing_baseline.is_empty() && ctx.unavailable.is_empty() {
        out.push_str("All model features have a reference baseline.\n");
    }
    if !ctx.missing_baseline.is_empty() {
        out.push_str(&format!(
            "Features not found in the reference dataset ({}; treated as missing): {}\n",
            ctx.missing_baseline.len(),
            preview_list(&ctx.missing_baseline, ctx.missing_preview).join(", ")
        ));
    }
    if !ctx.unavailable.is_empty() {
        out.push_str(&format!(
            "Features with no finite reference values (not positioned): {}\n",
            ctx.unavailable.join(", ")
        ));
    }

    out
}

fn score_line(label: &str, s: &PositionalScore) -> String {
    let direction = if s.z.is_nan() {
        "undefined spread"
    } else if s.is_above_mean() {
        "above mean"
    } else {
        "below mean"
    };
    format!(
        "- {}: value={} mean={} std={} z={} percentile={} ({})\n",
        label,
        format_f64_6(s.value),
        format_f64_6(s.mean),
        format_f64_6(s.std),
        format_f64_6(s.z),
        format_f64_6(s.percentile),
        direction
    )
}
