//! Survey record types
//!
//! A record holds the 20 raw item scores of one submission together with the
//! scores derived from them. On the wire and on disk a record is a flat JSON
//! object keyed by the survey column names (`zamanISO`, `OK1`, ..., `Genel_Ort`).

use crate::survey::scoring;
use crate::survey::validation::resolve_stored_score;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column holding the record creation time
pub const TIMESTAMP_KEY: &str = "zamanISO";

/// Number of items in each category
pub const ITEMS_PER_CATEGORY: usize = 5;

/// Total number of answered items per record
pub const ITEM_COUNT: usize = Category::ALL.len() * ITEMS_PER_CATEGORY;

/// Answer keys in declared order, grouped by category
pub const ITEM_KEYS: [&str; ITEM_COUNT] = [
    "OK1", "OK2", "OK3", "OK4", "OK5", //
    "PH1", "PH2", "PH3", "PH4", "PH5", //
    "KD1", "KD2", "KD3", "KD4", "KD5", //
    "TE1", "TE2", "TE3", "TE4", "TE5",
];

/// Key of the overall average
pub const OVERALL_SCORE_KEY: &str = "Genel_Ort";

/// Derived score keys in declared order (category averages, then overall)
pub const SCORE_KEYS: [&str; 5] = ["OK_Ort", "PH_Ort", "KD_Ort", "TE_Ort", OVERALL_SCORE_KEY];

/// One of the four fixed item groupings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `OK*` items
    Ok,
    /// `PH*` items
    Ph,
    /// `KD*` items
    Kd,
    /// `TE*` items
    Te,
}

impl Category {
    /// All categories in declared order
    pub const ALL: [Category; 4] = [Category::Ok, Category::Ph, Category::Kd, Category::Te];

    /// Position of the category in declared order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Two-letter prefix shared by the category's item keys
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Ok => "OK",
            Category::Ph => "PH",
            Category::Kd => "KD",
            Category::Te => "TE",
        }
    }

    /// Key of the category's average score
    pub fn score_key(self) -> &'static str {
        SCORE_KEYS[self.index()]
    }

    /// Item keys belonging to the category
    pub fn item_keys(self) -> &'static [&'static str] {
        let start = self.index() * ITEMS_PER_CATEGORY;
        &ITEM_KEYS[start..start + ITEMS_PER_CATEGORY]
    }
}

/// Validated item scores, indexed in `ITEM_KEYS` order
///
/// New submissions only carry whole numbers. Records read back from an
/// older store may hold fractional values in the same range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Answers([f64; ITEM_COUNT]);

impl Answers {
    /// Wrap already validated values (each in 1..=5)
    pub(crate) fn new(values: [f64; ITEM_COUNT]) -> Self {
        Self(values)
    }

    /// Value of a single item by key
    pub fn get(&self, key: &str) -> Option<f64> {
        ITEM_KEYS
            .iter()
            .position(|candidate| *candidate == key)
            .map(|idx| self.0[idx])
    }

    /// The five values of one category
    pub fn category(&self, category: Category) -> &[f64] {
        let start = category.index() * ITEMS_PER_CATEGORY;
        &self.0[start..start + ITEMS_PER_CATEGORY]
    }

    /// All values in declared order
    pub fn values(&self) -> &[f64; ITEM_COUNT] {
        &self.0
    }
}

/// Scores derived from a record's answers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    categories: [f64; 4],
    overall: f64,
}

impl Scores {
    pub(crate) fn new(categories: [f64; 4], overall: f64) -> Self {
        Self {
            categories,
            overall,
        }
    }

    /// Average of one category, rounded to 2 decimals
    pub fn category(&self, category: Category) -> f64 {
        self.categories[category.index()]
    }

    /// Average of the category averages, rounded to 2 decimals
    pub fn overall(&self) -> f64 {
        self.overall
    }

    /// Look up a derived score by its key
    pub fn get(&self, key: &str) -> Option<f64> {
        if key == OVERALL_SCORE_KEY {
            return Some(self.overall);
        }
        Category::ALL
            .iter()
            .find(|category| category.score_key() == key)
            .map(|category| self.category(*category))
    }
}

/// One submitted survey response
///
/// Records are immutable: the derived scores are computed from the answers
/// when the record is built and cannot be set independently.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    timestamp: DateTime<Utc>,
    answers: Answers,
    scores: Scores,
}

impl SurveyRecord {
    /// Build a record, computing its derived scores
    ///
    /// The timestamp is kept at millisecond precision, matching its
    /// serialized form.
    pub fn new(answers: Answers, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(3),
            answers,
            scores: scoring::score(&answers),
        }
    }

    /// Creation time
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Creation time as ISO-8601 UTC with millisecond precision
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Raw item scores
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Derived scores
    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    /// Textual value of a column, or `None` if the record has no such column
    pub fn field(&self, column: &str) -> Option<String> {
        if column == TIMESTAMP_KEY {
            return Some(self.timestamp_iso());
        }
        if let Some(value) = self.answers.get(column) {
            return Some(value.to_string());
        }
        self.scores.get(column).map(|score| score.to_string())
    }

    /// Rebuild a record from its stored JSON object
    ///
    /// Item values may be numbers or numeric strings in 1..=5, fractions
    /// included. Stored derived scores are ignored and recomputed from the
    /// items.
    fn from_fields(fields: &Map<String, Value>) -> Result<Self, String> {
        let raw_timestamp = fields
            .get(TIMESTAMP_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("missing {TIMESTAMP_KEY}"))?;
        let timestamp = DateTime::parse_from_rfc3339(raw_timestamp)
            .map_err(|e| format!("invalid {TIMESTAMP_KEY} '{raw_timestamp}': {e}"))?
            .with_timezone(&Utc);

        let mut values = [0.0; ITEM_COUNT];
        for (slot, key) in values.iter_mut().zip(ITEM_KEYS) {
            let raw = fields.get(key).ok_or_else(|| format!("missing {key}"))?;
            *slot = resolve_stored_score(raw)
                .ok_or_else(|| format!("invalid value for {key}: {raw}"))?;
        }

        Ok(Self::new(Answers::new(values), timestamp))
    }
}

impl Serialize for SurveyRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + ITEM_COUNT + SCORE_KEYS.len()))?;
        map.serialize_entry(TIMESTAMP_KEY, &self.timestamp_iso())?;
        for (key, value) in ITEM_KEYS.iter().zip(self.answers.values()) {
            // Whole scores stay JSON integers
            if value.fract() == 0.0 {
                map.serialize_entry(key, &(*value as i64))?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        for category in Category::ALL {
            map.serialize_entry(category.score_key(), &self.scores.category(category))?;
        }
        map.serialize_entry(OVERALL_SCORE_KEY, &self.scores.overall())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for SurveyRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        SurveyRecord::from_fields(&fields).map_err(de::Error::custom)
    }
}
