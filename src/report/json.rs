use crate::model::baseline::BaselineSet;
use crate::report::SummaryData;

/// Pretty JSON; undefined statistics (NaN z or percentile) serialize as `null`.
pub fn render_summary_json(data: &SummaryData) -> serde_json::Result<String> {
    let mut s = serde_json::to_string_pretty(data)?;
    s.push('\n');
    Ok(s)
}

pub fn render_baseline_json(baselines: &BaselineSet) -> serde_json::Result<String> {
    let mut s = serde_json::to_string_pretty(baselines)?;
    s.push('\n');
    Ok(s)
}
