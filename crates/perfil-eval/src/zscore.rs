// Z-score engine: standardize an athlete against a reference population.

use serde::Serialize;
use tracing::warn;

use crate::classify::{classify, ClinicalBand};
use crate::dataset::AthleteRecord;
use crate::metrics::Metric;
use crate::population::Population;
use crate::stats::{describe, metric_value, metric_values, round_to, ColumnStats};

/// Fewest valid values a metric needs before it is Z-scored.
pub const DEFAULT_MIN_POPULATION: usize = 3;

/// A standard deviation at or below this fraction of `|mean|` is summation
/// residue from identical values and counts as zero.
const RELATIVE_STD_FLOOR: f64 = 1e-12;

/// `(value - mean) / std` rounded to two decimals.
///
/// Returns `None` (undefined, not zero) when the value is missing or not
/// finite, or when the standard deviation is zero. Any positive std above
/// floating-point residue is used as is.
pub fn zscore(value: Option<f64>, mean: f64, std: f64) -> Option<f64> {
    let value = value.filter(|v| v.is_finite())?;
    if !std.is_finite() || std <= 0.0 || std <= mean.abs() * RELATIVE_STD_FLOOR {
        return None;
    }
    Some(round_to((value - mean) / std, 2))
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One scored metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreEntry {
    pub metric: String,
    /// The athlete's raw value (bilateral average for paired metrics).
    pub value: Option<f64>,
    /// Reference statistics at full precision.
    pub reference: ColumnStats,
    pub zscore: Option<f64>,
    pub band: ClinicalBand,
}

/// A metric left out because the population had too few valid values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsufficientMetric {
    pub metric: String,
    pub valid_values: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreSet {
    pub category: String,
    pub population_size: usize,
    pub min_population: usize,
    pub entries: Vec<ZScoreEntry>,
    pub insufficient: Vec<InsufficientMetric>,
}

impl ZScoreSet {
    /// True when nothing could be scored; callers show an "insufficient
    /// data" state instead of any number.
    pub fn is_insufficient(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, metric: &str) -> Option<&ZScoreEntry> {
        self.entries.iter().find(|e| e.metric == metric)
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Reference statistics for a metric. When the population has fewer than
/// `min_population` valid values, the error carries the valid count.
pub fn reference_stats(
    population: &Population<'_>,
    metric: &Metric,
    min_population: usize,
) -> Result<ColumnStats, usize> {
    let values = metric_values(population, metric);
    if values.len() < min_population {
        return Err(values.len());
    }
    Ok(describe(&values))
}

/// Score `record` on each metric against `population`. Metrics below the
/// population floor are omitted from `entries` and listed in `insufficient`.
pub fn score_metrics(
    record: &AthleteRecord,
    population: &Population<'_>,
    metrics: &[&Metric],
    min_population: usize,
) -> ZScoreSet {
    let mut entries = Vec::new();
    let mut insufficient = Vec::new();

    for metric in metrics {
        match reference_stats(population, metric, min_population) {
            Ok(reference) => {
                let value = metric_value(record, metric);
                let z = zscore(value, reference.mean, reference.std);
                entries.push(ZScoreEntry {
                    metric: metric.name.clone(),
                    value,
                    reference,
                    zscore: z,
                    band: classify(z),
                });
            }
            Err(valid_values) => {
                warn!(
                    "metric '{}' has {} valid values in '{}' (need {}); skipping Z-score",
                    metric.name, valid_values, population.category, min_population
                );
                insufficient.push(InsufficientMetric {
                    metric: metric.name.clone(),
                    valid_values,
                });
            }
        }
    }

    ZScoreSet {
        category: population.category.clone(),
        population_size: population.len(),
        min_population,
        entries,
        insufficient,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
