use crate::survey::model::{Answers, SurveyRecord, ITEM_COUNT};
use chrono::Utc;

/// Record whose 20 items all hold `value`
pub(crate) fn record_with(value: u8) -> SurveyRecord {
    SurveyRecord::new(Answers::new([f64::from(value); ITEM_COUNT]), Utc::now())
}
