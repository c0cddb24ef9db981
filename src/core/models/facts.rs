use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThresholdState {
    Normal,
    NearLimit,
    OverLimit,
}

/// Display-ready facts derived from a single credential record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayFacts {
    /// Spend in the window selected by the reset cadence (dollars)
    pub current_usage: f64,
    /// Share of the hard limit consumed, clamped to 0.0 - 100.0
    pub usage_ratio_percent: f64,
    pub threshold_state: ThresholdState,
    pub expiry_description: String,
    pub rate_limit_description: String,
    pub reset_cadence_description: String,
}
