use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const QUANTILE_MIN_RANK: u32 = 1;
pub const QUANTILE_MAX_RANK: u32 = 99;

/// Percentile rank -> value at that rank. Backed by a `BTreeMap` so iteration is always in
/// ascending rank order, which the percentile bracketing walk relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuantileTable {
    ranks: BTreeMap<u32, f64>,
}

impl QuantileTable {
    pub fn from_ranks(ranks: BTreeMap<u32, f64>) -> Self {
        Self { ranks }
    }

    pub fn get(&self, rank: u32) -> Option<f64> {
        self.ranks.get(&rank).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.ranks.iter().map(|(&r, &v)| (r, v))
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Form/validation range for a numeric answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputBounds {
    pub lo: f64,
    pub hi: f64,
    pub default: f64,
    pub step: f64,
    pub slider_min: f64,
    pub slider_max: f64,
}

impl InputBounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.slider_min && value <= self.slider_max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericBaseline {
    pub mean: f64,
    pub std: f64,
    pub n_finite: usize,
    pub quantiles: QuantileTable,
    pub bounds: InputBounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalBaseline {
    pub choices: Vec<String>,
}

impl CategoricalBaseline {
    pub fn contains(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureBaseline {
    Numeric(NumericBaseline),
    Categorical(CategoricalBaseline),
}

impl FeatureBaseline {
    pub fn as_numeric(&self) -> Option<&NumericBaseline> {
        match self {
            FeatureBaseline::Numeric(b) => Some(b),
            FeatureBaseline::Categorical(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_numeric().is_some()
    }
}

/// Output of the baseline builder for one (reference table, feature list) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineSet {
    /// Requested features that have a baseline, in request order.
    pub present: Vec<String>,
    pub baselines: BTreeMap<String, FeatureBaseline>,
    /// Requested features with no column in the reference table.
    pub missing: Vec<String>,
    /// Columns present but with no finite value; no baseline is built for them.
    pub unavailable: Vec<String>,
}

impl BaselineSet {
    pub fn get(&self, feature: &str) -> Option<&FeatureBaseline> {
        self.baselines.get(feature)
    }

    pub fn numeric(&self, feature: &str) -> Option<&NumericBaseline> {
        self.get(feature).and_then(FeatureBaseline::as_numeric)
    }

    pub fn numeric_features(&self) -> impl Iterator<Item = &str> {
        self.present
            .iter()
            .filter(|f| self.numeric(f).is_some())
            .map(String::as_str)
    }

    pub fn n_numeric(&self) -> usize {
        self.numeric_features().count()
    }
}
