//! Answer validation
//!
//! Checks a submitted answer mapping against the 20 required item keys.

use crate::survey::model::{Answers, ITEM_COUNT, ITEM_KEYS};
use serde_json::Value;
use thiserror::Error;

/// Lowest accepted item score
pub const MIN_SCORE: u8 = 1;
/// Highest accepted item score
pub const MAX_SCORE: u8 = 5;

/// Reasons a submission is rejected, each naming the offending key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required item key is absent
    #[error("missing answer: {0}")]
    MissingItem(&'static str),

    /// A value is non-numeric or outside 1..=5
    #[error("invalid value (1-5): {0}")]
    InvalidValue(&'static str),
}

impl ValidationError {
    /// The key at fault
    pub fn key(&self) -> &'static str {
        match self {
            ValidationError::MissingItem(key) | ValidationError::InvalidValue(key) => key,
        }
    }
}

/// Validate an answer mapping, stopping at the first failing key
///
/// Keys are checked in declared order. Keys outside the 20 item keys are
/// ignored. A non-object value has no keys, so it fails on the first one.
pub fn validate_answers(answers: &Value) -> Result<Answers, ValidationError> {
    let mut values = [0.0; ITEM_COUNT];
    for (slot, key) in values.iter_mut().zip(ITEM_KEYS) {
        let raw = answers.get(key).ok_or(ValidationError::MissingItem(key))?;
        *slot = f64::from(resolve_score(raw).ok_or(ValidationError::InvalidValue(key))?);
    }
    Ok(Answers::new(values))
}

/// Resolve a JSON value to an item score
///
/// Accepts whole numbers and numeric strings in 1..=5.
pub fn resolve_score(value: &Value) -> Option<u8> {
    resolve_stored_score(value)
        .filter(|number| number.fract() == 0.0)
        .map(|number| number as u8)
}

/// Resolve an item value read back from the store
///
/// Looser than [`resolve_score`]: any number in 1..=5 is kept, so records
/// written with fractional values still load.
pub fn resolve_stored_score(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (f64::from(MIN_SCORE)..=f64::from(MAX_SCORE))
        .contains(&number)
        .then_some(number)
}
