use std::collections::BTreeMap;

const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

/// One questionnaire answer after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
    Missing,
}

impl FeatureValue {
    /// Parses a raw cell: missing markers first, then a float, then plain text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_missing_marker(trimmed) {
            return FeatureValue::Missing;
        }
        match parse_number(trimmed) {
            Some(v) => FeatureValue::Numeric(v),
            None => FeatureValue::Categorical(trimmed.to_string()),
        }
    }

    pub fn as_finite(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }
}

pub fn is_missing_marker(s: &str) -> bool {
    MISSING_MARKERS.contains(&s)
}

/// Float parse that also accepts `inf`/`-inf`; the caller decides what to do with non-finite values.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// A single respondent's answers keyed by feature name, in model feature order.
#[derive(Debug, Clone)]
pub struct RespondentVector {
    features: Vec<String>,
    values: BTreeMap<String, FeatureValue>,
}

impl RespondentVector {
    /// Every feature in `features` gets an entry; anything not supplied is `Missing`.
    pub fn new(features: &[String], supplied: BTreeMap<String, FeatureValue>) -> Self {
        let mut values = BTreeMap::new();
        for name in features {
            let value = supplied
                .get(name)
                .cloned()
                .unwrap_or(FeatureValue::Missing);
            values.insert(name.clone(), value);
        }
        Self {
            features: features.to_vec(),
            values,
        }
    }

    pub fn get(&self, feature: &str) -> &FeatureValue {
        self.values.get(feature).unwrap_or(&FeatureValue::Missing)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.features
            .iter()
            .map(move |name| (name.as_str(), self.get(name)))
    }

    pub fn n_missing(&self) -> usize {
        self.values.values().filter(|v| v.is_missing()).count()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/value.rs"]
mod tests;
