// Population filtering: strip summary rows, keep real athletes of one category.

use crate::dataset::{AthleteRecord, Dataset};

/// Summary-row labels the evaluation sheet mixes in with athlete rows.
pub const EXCLUDED_NAMES: [&str; 10] = [
    "MEDIA",
    "SD",
    "TOTAL EN RIESGO ALTO",
    "RIESGO RELATIVO",
    "TOTAL EN RIESGO MODERADO",
    "TOTAL EN BAJO RIESGO",
    "Apellido y Nombre",
    "ALTO RIESGO",
    "MODERADO RIESGO",
    "BAJO RIESGO",
];

/// Any name containing one of these (case-insensitively) is a summary row.
/// Note that "SD" also matches names such as "Osdaldo"; the sheet has always
/// been cleaned this way.
pub const EXCLUDED_SUBSTRINGS: [&str; 4] = ["RIESGO", "MEDIA", "TOTAL", "SD"];

/// True when `name` looks like a real athlete rather than a summary label.
pub fn is_athlete_name(name: &str) -> bool {
    if EXCLUDED_NAMES.contains(&name) {
        return false;
    }
    let upper = name.to_uppercase();
    !EXCLUDED_SUBSTRINGS.iter().any(|s| upper.contains(s))
}

/// The athletes of one category, borrowed from the loaded dataset.
#[derive(Debug, Clone)]
pub struct Population<'a> {
    pub category: String,
    records: Vec<&'a AthleteRecord>,
}

impl<'a> Population<'a> {
    pub fn new(category: &str, records: Vec<&'a AthleteRecord>) -> Self {
        Population {
            category: category.to_string(),
            records,
        }
    }

    pub fn records(&self) -> &[&'a AthleteRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when at least one member carries the column, even if blank.
    pub fn has_column(&self, column: &str) -> bool {
        self.records.iter().any(|r| r.has_column(column))
    }

    /// Valid (non-missing) values of a column across the population.
    pub fn values(&self, column: &str) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.value(column)).collect()
    }
}

/// Keep records of `category` whose name is present and is not a summary
/// label. An empty result is valid.
pub fn filter_population<'a>(records: &'a [AthleteRecord], category: &str) -> Population<'a> {
    let kept = records
        .iter()
        .filter(|r| r.category.as_deref() == Some(category))
        .filter(|r| r.name.as_deref().is_some_and(is_athlete_name))
        .collect();
    Population::new(category, kept)
}

/// `filter_population` over a whole dataset.
pub fn category_population<'a>(dataset: &'a Dataset, category: &str) -> Population<'a> {
    filter_population(dataset.records(), category)
}
