use crate::model::baseline::{
    BaselineSet, NumericBaseline, QUANTILE_MAX_RANK, QUANTILE_MIN_RANK, QuantileTable,
};
use crate::model::scores::PositionalScore;
use crate::model::value::{FeatureValue, RespondentVector};

/// `(x - mean) / std`, or NaN when the spread is zero or non-finite.
pub fn zscore(x: f64, mean: f64, std: f64) -> f64 {
    if std == 0.0 || !std.is_finite() {
        return f64::NAN;
    }
    (x - mean) / std
}

/// Fractional percentile rank of `x` by bracketing it between adjacent quantile ranks.
///
/// Below the first rank the result is that rank; at or above the last it is the last rank.
/// Equal bracketing values fall back to the lower rank. NaN only for an empty table.
pub fn empirical_percentile(x: f64, quantiles: &QuantileTable) -> f64 {
    if quantiles.is_empty() {
        return f64::NAN;
    }

    let mut lo = QUANTILE_MIN_RANK;
    let mut hi = QUANTILE_MAX_RANK;
    // ascending rank order is guaranteed by QuantileTable
    for (rank, value) in quantiles.iter() {
        if x >= value {
            lo = rank;
        } else {
            hi = rank;
            break;
        }
    }

    let (Some(v_lo), Some(v_hi)) = (quantiles.get(lo), quantiles.get(hi)) else {
        return lo as f64;
    };
    if lo == hi || v_hi == v_lo {
        return lo as f64;
    }
    let frac = (x - v_lo) / (v_hi - v_lo);
    let pct = lo as f64 + frac * (hi - lo) as f64;
    pct.clamp(QUANTILE_MIN_RANK as f64, QUANTILE_MAX_RANK as f64)
}

pub fn score(feature: &str, value: f64, baseline: &NumericBaseline) -> PositionalScore {
    PositionalScore {
        feature: feature.to_string(),
        value,
        mean: baseline.mean,
        std: baseline.std,
        z: zscore(value, baseline.mean, baseline.std),
        percentile: empirical_percentile(value, &baseline.quantiles),
    }
}

/// Scores every numeric feature the respondent answered with a finite number.
/// Categorical, missing, and baseline-less features are skipped.
pub fn score_respondent(
    baselines: &BaselineSet,
    respondent: &RespondentVector,
) -> Vec<PositionalScore> {
    let mut out = Vec::new();
    for (name, value) in respondent.iter() {
        let Some(baseline) = baselines.numeric(name) else {
            continue;
        };
        match value.as_finite() {
            Some(v) => out.push(score(name, v, baseline)),
            None => {
                if let FeatureValue::Categorical(s) = value {
                    tracing::debug!(feature = %name, value = %s, "non-numeric answer not scored");
                }
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_position.rs"]
mod tests;
