use serde::Serialize;

/// Position of one numeric answer against its population baseline.
/// `z` is NaN when the spread is zero or non-finite; `percentile` is NaN when the quantile table is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionalScore {
    pub feature: String,
    pub value: f64,
    pub mean: f64,
    pub std: f64,
    pub z: f64,
    pub percentile: f64,
}

impl PositionalScore {
    pub fn abs_z(&self) -> f64 {
        self.z.abs()
    }

    pub fn is_above_mean(&self) -> bool {
        self.z >= 0.0
    }
}
