mod classifier;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::classifier::ClassifierError;
use crate::classifier::logistic::LogisticModel;
use crate::input::InputError;
use crate::input::meta::load_model_meta;
use crate::input::respondent::load_respondent;
use crate::model::thresholds::DecisionProfile;
use crate::pipeline::ScoringError;
use crate::pipeline::session::BaselineCache;
use crate::pipeline::stage1_baseline::Stage1Params;
use crate::pipeline::stage4_report::{Stage4Input, write_reports};
use crate::pipeline::submission::{Submission, TextModelState, score_submission};
use crate::report::json::render_baseline_json;
use crate::report::preview_list;

const TOOL_NAME: &str = "kira-riskqc";

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Parser)]
#[command(name = TOOL_NAME, version, about = "Questionnaire risk scoring against a reference population")]
struct Cli {
    /// Debug-level logging (RUST_LOG still wins).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build population baselines and write baseline.json.
    Baseline(BaselineArgs),
    /// Score one or more respondents.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct BaselineArgs {
    /// Reference dataset (CSV/TSV, optionally .gz).
    #[arg(long)]
    reference: PathBuf,
    /// Model metadata JSON with the feature list.
    #[arg(long)]
    meta: PathBuf,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[arg(long)]
    reference: PathBuf,
    #[arg(long)]
    meta: PathBuf,
    /// Behavioral model JSON.
    #[arg(long)]
    model: PathBuf,
    /// Optional text model JSON; an unresolvable path falls back to behavior-only scoring.
    #[arg(long)]
    text_model: Option<PathBuf>,
    /// Respondent answers JSON; repeat to score several against one baseline.
    #[arg(long = "respondent", required = true)]
    respondents: Vec<PathBuf>,
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,
    #[arg(long)]
    text_file: Option<PathBuf>,
    #[arg(long, value_parser = parse_weight)]
    weight_behavior: Option<f64>,
    #[arg(long)]
    top_k: Option<usize>,
    #[arg(long)]
    out: PathBuf,
}

fn parse_weight(raw: &str) -> Result<f64, String> {
    let w: f64 = raw
        .parse()
        .map_err(|_| format!("invalid weight {raw:?}"))?;
    if !(0.0..=1.0).contains(&w) {
        return Err(format!("weight must be within [0, 1], got {w}"));
    }
    Ok(w)
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Baseline(args) => run_baseline(&args),
        Command::Run(args) => run_scoring(&args),
    }
}

fn run_baseline(args: &BaselineArgs) -> Result<(), AppError> {
    let profile = DecisionProfile::default_v1();
    let meta = load_model_meta(&args.meta)?;
    let cache = BaselineCache::new(Stage1Params::from(&profile));
    let baselines = cache.get_or_build(&args.reference, &meta.features)?;
    warn_missing(&baselines.missing, &baselines.unavailable, &profile);

    let path = args.out.join("baseline.json");
    fs::create_dir_all(&args.out).map_err(|e| write_error(&args.out, e))?;
    let json = render_baseline_json(&baselines).map_err(|e| write_error(&path, e.into()))?;
    fs::write(&path, json).map_err(|e| write_error(&path, e))?;
    tracing::info!(path = %path.display(), "wrote baseline");
    Ok(())
}

fn run_scoring(args: &RunArgs) -> Result<(), AppError> {
    let mut profile = DecisionProfile::default_v1();
    if let Some(k) = args.top_k {
        profile.top_k = k;
    }
    let weight_behavior = args.weight_behavior.unwrap_or(profile.weight_behavior);

    let meta = load_model_meta(&args.meta)?;
    let labels = meta.question_labels();
    let behavior = LogisticModel::load(&args.model, &meta.features)?;

    let text = read_text_input(args)?;
    let text_model = if text.as_deref().is_some_and(|t| !t.trim().is_empty()) {
        TextModelState::resolve(args.text_model.as_deref())
    } else {
        TextModelState::NotConfigured
    };

    let cache = BaselineCache::new(Stage1Params::from(&profile));
    let multi = args.respondents.len() > 1;
    for (i, respondent_path) in args.respondents.iter().enumerate() {
        let baselines = cache.get_or_build(&args.reference, &meta.features)?;
        if i == 0 {
            warn_missing(&baselines.missing, &baselines.unavailable, &profile);
        }

        let respondent = load_respondent(respondent_path, &meta.features, &baselines)?;
        let submission = Submission {
            respondent: &respondent,
            text: text.as_deref(),
            weight_behavior,
        };
        let result =
            score_submission(&baselines, &behavior, &text_model, &submission, &profile)?;

        let respondent_id = respondent_id(respondent_path);
        let out_dir = resolve_output_dir(&args.out, &respondent_id, multi);
        let input = Stage4Input {
            respondent_id,
            n_features: meta.features.len(),
            n_answered: meta.features.len() - respondent.n_missing(),
            decision: &result.decision,
            text_channel: &result.text_channel,
            report: &result.report,
            baselines: &baselines,
            labels: &labels,
            profile: &profile,
            tool_name: TOOL_NAME.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        };
        let written = write_reports(&input, &out_dir).map_err(|e| write_error(&out_dir, e))?;
        tracing::info!(
            report = %written.report_txt.display(),
            summary = %written.summary_json.display(),
            deviations = %written.deviation_csv.display(),
            outliers = %written.outliers_csv.display(),
            "wrote reports"
        );
    }
    tracing::debug!(
        builds = cache.builds(),
        entries = cache.len(),
        "baseline cache usage"
    );
    Ok(())
}

fn read_text_input(args: &RunArgs) -> Result<Option<String>, AppError> {
    if let Some(path) = &args.text_file {
        let text = fs::read_to_string(path)
            .map_err(|e| InputError::MissingInput(format!("{}: {e}", path.display())))?;
        return Ok(Some(text));
    }
    Ok(args.text.clone())
}

fn warn_missing(missing: &[String], unavailable: &[String], profile: &DecisionProfile) {
    if !missing.is_empty() {
        tracing::warn!(
            count = missing.len(),
            features = %preview_list(missing, profile.missing_preview).join(", "),
            "features not found in the reference dataset; answers are treated as missing"
        );
    }
    if !unavailable.is_empty() {
        tracing::warn!(
            features = %unavailable.join(", "),
            "features with no finite reference values; not positioned"
        );
    }
}

fn respondent_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "respondent".to_string())
}

fn resolve_output_dir(base: &Path, respondent_id: &str, multi: bool) -> PathBuf {
    if multi {
        base.join(respondent_id)
    } else {
        base.to_path_buf()
    }
}

fn write_error(path: &Path, source: std::io::Error) -> AppError {
    AppError::Write {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;

#[cfg(test)]
#[path = "../tests/src_inline/test_support.rs"]
mod test_support;
