//! Aggregate statistics over the store

use crate::survey::model::{Category, SurveyRecord};
use crate::survey::scoring::{mean, round2};
use serde::Serialize;

/// Maximum number of records returned by a listing
pub const RECENT_LIMIT: usize = 1000;

/// Mean of each derived score across all records
///
/// Every field is `None` when there are no records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreStats {
    /// Mean of `OK_Ort`
    #[serde(rename = "OK_Ort")]
    pub ok: Option<f64>,
    /// Mean of `PH_Ort`
    #[serde(rename = "PH_Ort")]
    pub ph: Option<f64>,
    /// Mean of `KD_Ort`
    #[serde(rename = "KD_Ort")]
    pub kd: Option<f64>,
    /// Mean of `TE_Ort`
    #[serde(rename = "TE_Ort")]
    pub te: Option<f64>,
    /// Mean of `Genel_Ort`
    #[serde(rename = "Genel_Ort")]
    pub overall: Option<f64>,
}

/// Compute per-score means, rounded to two decimals
pub fn summarize(records: &[SurveyRecord]) -> ScoreStats {
    let category_mean = |category: Category| {
        mean(records.iter().map(|r| r.scores().category(category))).map(round2)
    };
    ScoreStats {
        ok: category_mean(Category::Ok),
        ph: category_mean(Category::Ph),
        kd: category_mean(Category::Kd),
        te: category_mean(Category::Te),
        overall: mean(records.iter().map(|r| r.scores().overall())).map(round2),
    }
}

/// The last `limit` records, in insertion order
pub fn recent(records: &[SurveyRecord], limit: usize) -> &[SurveyRecord] {
    &records[records.len().saturating_sub(limit)..]
}
