// Report assembly: comparison table, Z-score overview and group profile.
//
// Every function here is a pure function of its inputs. The result is a
// value object consumed by the dashboard, the chart renderer and the export
// layer.

use perfil_core::config::{Config, ReferencePolicy};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::chart::{bilateral_chart, radar_chart, BilateralChart, RadarChart};
use crate::dataset::{AthleteRecord, Dataset};
use crate::metrics::{MetricRegistry, Section};
use crate::population::{category_population, Population};
use crate::stats::{compute_group_statistics, summarize, ColumnStats, GroupSummary};
use crate::zscore::{score_metrics, ZScoreSet, DEFAULT_MIN_POPULATION};

// ---------------------------------------------------------------------------
// Errors and warnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReportError {
    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("athlete '{athlete}' not found in category '{category}'")]
    AthleteNotFound { athlete: String, category: String },

    #[error("no valid columns for section '{section}': none of its metrics exist in the data for '{subject}'")]
    NoValidColumns { section: String, subject: String },

    #[error("the dataset has no categories to use as a reference population")]
    NoReferenceCategory,
}

/// Recoverable problems surfaced alongside a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    /// The athlete's data has no such column; the row was left out.
    ColumnMissingForAthlete { column: String },
    /// The reference population has no such column; statistics are zero.
    ColumnMissingInPopulation { column: String },
    /// The population carries the column but every cell is blank.
    NoPopulationValues { column: String },
    /// Too few valid values to Z-score the metric.
    InsufficientPopulation {
        metric: String,
        valid_values: usize,
        required: usize,
    },
}

impl std::fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportWarning::ColumnMissingForAthlete { column } => {
                write!(f, "column '{column}' not found in the athlete's data")
            }
            ReportWarning::ColumnMissingInPopulation { column } => {
                write!(f, "column '{column}' not found in the reference population; statistics shown as 0.0")
            }
            ReportWarning::NoPopulationValues { column } => {
                write!(f, "column '{column}' has no values in the reference population")
            }
            ReportWarning::InsufficientPopulation {
                metric,
                valid_values,
                required,
            } => write!(
                f,
                "insufficient data for '{metric}': {valid_values} valid values, {required} required"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Why a row's statistics should not be read at face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowFlag {
    MissingPopulationColumn,
    NoPopulationValues,
}

/// One line of the comparison table: the athlete's raw value against the
/// population mean and standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub column: String,
    pub athlete_value: Option<f64>,
    pub reference: ColumnStats,
    pub flag: Option<RowFlag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteReport {
    pub athlete: String,
    pub category: String,
    /// Category the statistics were computed over.
    pub reference_category: String,
    /// Athletes in the reference population.
    pub population_size: usize,
    pub section: String,
    pub rows: Vec<ComparisonRow>,
    pub overview: ZScoreSet,
    pub bars: BilateralChart,
    pub radar: RadarChart,
    pub warnings: Vec<ReportWarning>,
}

impl AthleteReport {
    pub fn row(&self, column: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.column == column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub column: String,
    /// `None` when no athlete has a value for the column.
    pub summary: Option<GroupSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    pub category: String,
    pub section: String,
    pub population_size: usize,
    pub rows: Vec<GroupRow>,
    pub warnings: Vec<ReportWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub min_population: usize,
    pub overview_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            min_population: DEFAULT_MIN_POPULATION,
            overview_limit: 5,
        }
    }
}

impl ReportOptions {
    pub fn from_config(config: &Config) -> Self {
        ReportOptions {
            min_population: config.zscore.min_population,
            overview_limit: config.zscore.overview_limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build the individual profile of `record` against `population`.
///
/// Columns the athlete lacks are left out with a warning. Columns the
/// population lacks keep their row with zero statistics and a flag. When no
/// row survives, the report cannot be built.
pub fn assemble_athlete_report(
    record: &AthleteRecord,
    category: &str,
    population: &Population<'_>,
    section: &Section,
    options: &ReportOptions,
) -> Result<AthleteReport, ReportError> {
    let athlete = record.name.clone().unwrap_or_default();
    let mut warnings = Vec::new();
    let mut rows = Vec::new();

    let columns = section.table_columns();
    let statistics = compute_group_statistics(population, &columns);

    for (column, reference) in statistics.iter() {
        if !record.has_column(column) {
            warn!("column '{}' not found for athlete '{}'", column, athlete);
            warnings.push(ReportWarning::ColumnMissingForAthlete {
                column: column.to_string(),
            });
            continue;
        }

        let flag = if statistics.is_missing(column) {
            warn!(
                "column '{}' not found in population '{}'; using zero statistics",
                column, population.category
            );
            warnings.push(ReportWarning::ColumnMissingInPopulation {
                column: column.to_string(),
            });
            Some(RowFlag::MissingPopulationColumn)
        } else if reference.n == 0 {
            warnings.push(ReportWarning::NoPopulationValues {
                column: column.to_string(),
            });
            Some(RowFlag::NoPopulationValues)
        } else {
            None
        };

        rows.push(ComparisonRow {
            column: column.to_string(),
            athlete_value: record.value(column),
            reference: *reference,
            flag,
        });
    }

    if rows.is_empty() {
        return Err(ReportError::NoValidColumns {
            section: section.name.clone(),
            subject: athlete,
        });
    }

    let overview_metrics = section.overview_metrics(options.overview_limit);
    let overview = score_metrics(record, population, &overview_metrics, options.min_population);
    for missing in &overview.insufficient {
        warnings.push(ReportWarning::InsufficientPopulation {
            metric: missing.metric.clone(),
            valid_values: missing.valid_values,
            required: options.min_population,
        });
    }

    let bars = bilateral_chart(record, &section.metrics);
    let radar = radar_chart(&overview);

    debug!(
        "assembled '{}' report for '{}' ({} rows, {} scored, {} warnings)",
        section.name,
        athlete,
        rows.len(),
        overview.entries.len(),
        warnings.len()
    );

    Ok(AthleteReport {
        athlete,
        category: category.to_string(),
        reference_category: statistics.category.clone(),
        population_size: statistics.population_size,
        section: section.name.clone(),
        rows,
        overview,
        bars,
        radar,
        warnings,
    })
}

/// Build the group profile: mean, std, min and max per column.
pub fn assemble_group_report(
    population: &Population<'_>,
    section: &Section,
) -> Result<GroupReport, ReportError> {
    let mut warnings = Vec::new();
    let mut rows = Vec::new();

    for column in section.table_columns() {
        if !population.has_column(column) {
            warnings.push(ReportWarning::ColumnMissingInPopulation {
                column: column.to_string(),
            });
            continue;
        }
        let summary = summarize(&population.values(column));
        if summary.is_none() {
            warnings.push(ReportWarning::NoPopulationValues {
                column: column.to_string(),
            });
        }
        rows.push(GroupRow {
            column: column.to_string(),
            summary,
        });
    }

    if rows.is_empty() {
        return Err(ReportError::NoValidColumns {
            section: section.name.clone(),
            subject: population.category.clone(),
        });
    }

    Ok(GroupReport {
        category: population.category.clone(),
        section: section.name.clone(),
        population_size: population.len(),
        rows,
        warnings,
    })
}

// ---------------------------------------------------------------------------
// Dataset-level entry points
// ---------------------------------------------------------------------------

/// Ties a loaded dataset to the metric registry and reporting options.
#[derive(Debug, Clone, Copy)]
pub struct ReportBuilder<'a> {
    pub dataset: &'a Dataset,
    pub registry: &'a MetricRegistry,
    pub options: ReportOptions,
    pub policy: ReferencePolicy,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(dataset: &'a Dataset, registry: &'a MetricRegistry) -> Self {
        ReportBuilder {
            dataset,
            registry,
            options: ReportOptions::default(),
            policy: ReferencePolicy::SelectedCategory,
        }
    }

    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_policy(mut self, policy: ReferencePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn section(&self, name: &str) -> Result<&'a Section, ReportError> {
        self.registry
            .section(name)
            .ok_or_else(|| ReportError::UnknownSection(name.to_string()))
    }

    /// Category an athlete of `category` is standardized against.
    pub fn reference_category<'c>(&self, category: &'c str) -> Result<&'c str, ReportError>
    where
        'a: 'c,
    {
        match self.policy {
            ReferencePolicy::SelectedCategory => Ok(category),
            ReferencePolicy::LargestCategory => self
                .dataset
                .largest_category()
                .ok_or(ReportError::NoReferenceCategory),
        }
    }

    pub fn athlete_report(
        &self,
        category: &str,
        athlete: &str,
        section: &str,
    ) -> Result<AthleteReport, ReportError> {
        let section = self.section(section)?;
        let record = self
            .dataset
            .find_athlete(category, athlete)
            .ok_or_else(|| ReportError::AthleteNotFound {
                athlete: athlete.to_string(),
                category: category.to_string(),
            })?;
        let reference = self.reference_category(category)?;
        let population = category_population(self.dataset, reference);
        assemble_athlete_report(record, category, &population, section, &self.options)
    }

    pub fn group_report(&self, category: &str, section: &str) -> Result<GroupReport, ReportError> {
        let section = self.section(section)?;
        let population = category_population(self.dataset, category);
        assemble_group_report(&population, section)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
