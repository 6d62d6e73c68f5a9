// Descriptive statistics over a filtered population.

use serde::Serialize;

use crate::dataset::AthleteRecord;
use crate::metrics::{Metric, MetricColumns};
use crate::population::Population;

// ---------------------------------------------------------------------------
// Column statistics
// ---------------------------------------------------------------------------

/// Mean and sample standard deviation of one column over a population.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
    /// Number of valid values the statistics were computed from.
    pub n: usize,
}

impl ColumnStats {
    /// Copy rounded to one decimal, for display only.
    pub fn rounded(&self) -> ColumnStats {
        ColumnStats {
            mean: round_to(self.mean, 1),
            std: round_to(self.std, 1),
            n: self.n,
        }
    }
}

/// Round to `decimals` places, ties to even, so exact halves agree with
/// the rounding the evaluation spreadsheets use (`-0.25` -> `-0.2`).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Compute mean and sample standard deviation (n - 1 denominator).
///
/// An empty slice yields all zeros; a single value yields `std == 0.0`.
pub fn describe(values: &[f64]) -> ColumnStats {
    if values.is_empty() {
        return ColumnStats::default();
    }
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };
    ColumnStats { mean, std, n }
}

// ---------------------------------------------------------------------------
// Metric values
// ---------------------------------------------------------------------------

/// Row-wise average of the two sides, skipping a missing side. `None` when
/// both sides are missing.
pub fn bilateral_average(record: &AthleteRecord, right: &str, left: &str) -> Option<f64> {
    match (record.value(right), record.value(left)) {
        (Some(r), Some(l)) => Some((r + l) / 2.0),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

/// One athlete's value for a metric: the bilateral average for paired
/// metrics, the total column otherwise.
pub fn metric_value(record: &AthleteRecord, metric: &Metric) -> Option<f64> {
    match &metric.columns {
        MetricColumns::Bilateral { right, left } => bilateral_average(record, right, left),
        MetricColumns::Total { column } => record.value(column),
    }
}

/// Population values for a metric. Bilateral metrics are averaged per
/// athlete first, so the result is one value per athlete with data on at
/// least one side.
pub fn metric_values(population: &Population<'_>, metric: &Metric) -> Vec<f64> {
    population
        .records()
        .iter()
        .filter_map(|r| metric_value(r, metric))
        .collect()
}

/// True when the population carries every column the metric needs.
pub fn population_has_metric(population: &Population<'_>, metric: &Metric) -> bool {
    metric
        .columns
        .columns()
        .iter()
        .all(|c| population.has_column(c))
}

// ---------------------------------------------------------------------------
// Group statistics
// ---------------------------------------------------------------------------

/// Per-column statistics for a population, in the requested column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatistics {
    pub category: String,
    /// Number of athletes in the population (not per-column counts).
    pub population_size: usize,
    columns: Vec<(String, ColumnStats)>,
    /// Requested columns the population does not carry; their statistics
    /// are zero.
    pub missing_columns: Vec<String>,
}

impl GroupStatistics {
    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnStats)> {
        self.columns.iter().map(|(c, s)| (c.as_str(), s))
    }

    pub fn is_missing(&self, column: &str) -> bool {
        self.missing_columns.iter().any(|c| c == column)
    }
}

/// Mean and standard deviation per column. Absent columns default to zero
/// statistics and are listed in `missing_columns`; blank cells are skipped.
pub fn compute_group_statistics(population: &Population<'_>, columns: &[&str]) -> GroupStatistics {
    let mut out = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();
    for column in columns {
        if !population.has_column(column) {
            missing.push(column.to_string());
            out.push((column.to_string(), ColumnStats::default()));
            continue;
        }
        out.push((column.to_string(), describe(&population.values(column))));
    }
    GroupStatistics {
        category: population.category.clone(),
        population_size: population.len(),
        columns: out,
        missing_columns: missing,
    }
}

// ---------------------------------------------------------------------------
// Group summary (mean, std, min, max)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupSummary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

/// Full summary of a set of values, `None` when there are none.
pub fn summarize(values: &[f64]) -> Option<GroupSummary> {
    if values.is_empty() {
        return None;
    }
    let stats = describe(values);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(GroupSummary {
        mean: stats.mean,
        std: stats.std,
        min,
        max,
        n: stats.n,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
