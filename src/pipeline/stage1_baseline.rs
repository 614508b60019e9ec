use std::collections::BTreeMap;

use crate::input::table::ReferenceTable;
use crate::model::baseline::{
    BaselineSet, CategoricalBaseline, FeatureBaseline, InputBounds, NumericBaseline,
    QUANTILE_MAX_RANK, QUANTILE_MIN_RANK, QuantileTable,
};
use crate::model::thresholds::DecisionProfile;
use crate::model::value::FeatureValue;

#[derive(Debug, Clone, Copy)]
pub struct Stage1Params {
    pub categorical_limit: usize,
}

impl From<&DecisionProfile> for Stage1Params {
    fn from(profile: &DecisionProfile) -> Self {
        Self {
            categorical_limit: profile.categorical_limit,
        }
    }
}

impl Default for Stage1Params {
    fn default() -> Self {
        Self::from(&DecisionProfile::default_v1())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnKind {
    Numeric(Vec<f64>),
    Categorical,
    Unavailable,
}

/// Builds per-feature baselines for every requested feature that has a column in `table`.
/// Pure and deterministic in (table, features).
pub fn build_baselines(
    table: &ReferenceTable,
    features: &[String],
    params: &Stage1Params,
) -> BaselineSet {
    let mut out = BaselineSet::default();

    for name in features {
        let Some(column) = table.column(name) else {
            out.missing.push(name.clone());
            continue;
        };
        match classify_column(column) {
            ColumnKind::Numeric(finite) => match numeric_baseline(&finite) {
                Some(b) => {
                    out.baselines
                        .insert(name.clone(), FeatureBaseline::Numeric(b));
                    out.present.push(name.clone());
                }
                None => out.unavailable.push(name.clone()),
            },
            ColumnKind::Categorical => {
                let choices = categorical_choices(column, params.categorical_limit);
                out.baselines.insert(
                    name.clone(),
                    FeatureBaseline::Categorical(CategoricalBaseline { choices }),
                );
                out.present.push(name.clone());
            }
            ColumnKind::Unavailable => out.unavailable.push(name.clone()),
        }
    }

    out
}

/// Numeric when every non-missing cell parses as a float and at least one is finite.
fn classify_column(column: &[Option<String>]) -> ColumnKind {
    let mut finite = Vec::with_capacity(column.len());
    for cell in column {
        let Some(raw) = cell else { continue };
        match FeatureValue::parse(raw) {
            FeatureValue::Missing => {}
            FeatureValue::Numeric(v) => {
                if v.is_finite() {
                    finite.push(v);
                }
            }
            FeatureValue::Categorical(_) => return ColumnKind::Categorical,
        }
    }
    if finite.is_empty() {
        ColumnKind::Unavailable
    } else {
        ColumnKind::Numeric(finite)
    }
}

/// `None` when there is no finite value to summarise.
pub fn numeric_baseline(values: &[f64]) -> Option<NumericBaseline> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let (mean, std) = mean_std(&sorted);
    let mut ranks = BTreeMap::new();
    for rank in QUANTILE_MIN_RANK..=QUANTILE_MAX_RANK {
        ranks.insert(rank, percentile_linear(&sorted, rank as f64));
    }
    let bounds = input_bounds(&sorted, mean);

    Some(NumericBaseline {
        mean,
        std,
        n_finite: sorted.len(),
        quantiles: QuantileTable::from_ranks(ranks),
        bounds,
    })
}

/// Mean and population (ddof = 0) standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Linear-interpolation percentile (`q` in 0..=100) over ascending `sorted`.
pub fn percentile_linear(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * (q / 100.0).clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = h - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn input_bounds(sorted: &[f64], mean: f64) -> InputBounds {
    let mut lo = percentile_linear(sorted, 1.0);
    let mut hi = percentile_linear(sorted, 99.0);
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        lo = sorted[0];
        hi = sorted[sorted.len() - 1];
    }
    let default = if mean.is_finite() {
        mean
    } else {
        (lo + hi) / 2.0
    };
    let step = if hi - lo > 5.0 { 1.0 } else { 0.1 };
    InputBounds {
        lo,
        hi,
        default,
        step,
        slider_min: lo.floor(),
        slider_max: hi.ceil(),
    }
}

/// Distinct non-missing values, most frequent first, ties by first occurrence.
fn categorical_choices(column: &[Option<String>], limit: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    for cell in column.iter().flatten() {
        let value = cell.trim();
        if FeatureValue::parse(value).is_missing() {
            continue;
        }
        match index.get(value) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                index.insert(value.to_string(), counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }
    // stable sort keeps first-occurrence order within equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts.into_iter().map(|(v, _)| v).collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_baseline.rs"]
mod tests;
