//! Score derivation
//!
//! Pure arithmetic over validated answers. All averages are rounded to two
//! decimal places, half away from zero.

use crate::survey::model::{Answers, Category, Scores};

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean, `None` for an empty input
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Compute category averages and the overall average
pub fn score(answers: &Answers) -> Scores {
    let categories = Category::ALL.map(|category| {
        let items = answers.category(category).iter().copied();
        mean(items).map(round2).unwrap_or_default()
    });
    let overall = mean(categories).map(round2).unwrap_or_default();
    Scores::new(categories, overall)
}
