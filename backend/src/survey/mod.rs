//! Survey domain
//!
//! Record types, answer validation, score derivation, aggregate statistics
//! and CSV export. Nothing in here touches storage or HTTP.

pub mod csv;
pub mod model;
pub mod scoring;
pub mod stats;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use model::{
    Answers, Category, Scores, SurveyRecord, ITEM_KEYS, OVERALL_SCORE_KEY, SCORE_KEYS,
    TIMESTAMP_KEY,
};
pub use stats::ScoreStats;
pub use validation::{validate_answers, ValidationError};
