// Typed metric registry: logical metric name -> one or two physical columns.
//
// Resolved once from configuration; the statistics and report code never
// looks columns up by ad-hoc string keys.

use perfil_core::config::{Config, MetricConfig, SectionConfig};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("metric '{metric}' in section '{section}' must declare a right/left pair or a total column")]
    InvalidColumns { section: String, metric: String },

    #[error("no sections configured")]
    Empty,
}

/// Physical columns backing a metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricColumns {
    /// Measured on both sides of the body.
    Bilateral { right: String, left: String },
    /// A single combined value without a side split.
    Total { column: String },
}

impl MetricColumns {
    /// Columns in table order (right before left).
    pub fn columns(&self) -> Vec<&str> {
        match self {
            MetricColumns::Bilateral { right, left } => vec![right.as_str(), left.as_str()],
            MetricColumns::Total { column } => vec![column.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub name: String,
    pub columns: MetricColumns,
    /// Included in the compact Z-score overview.
    pub overview: bool,
}

impl Metric {
    pub fn bilateral(name: &str, right: &str, left: &str) -> Self {
        Metric {
            name: name.to_string(),
            columns: MetricColumns::Bilateral {
                right: right.to_string(),
                left: left.to_string(),
            },
            overview: false,
        }
    }

    pub fn total(name: &str, column: &str) -> Self {
        Metric {
            name: name.to_string(),
            columns: MetricColumns::Total {
                column: column.to_string(),
            },
            overview: false,
        }
    }

    pub fn with_overview(mut self) -> Self {
        self.overview = true;
        self
    }

    pub fn is_total(&self) -> bool {
        matches!(self.columns, MetricColumns::Total { .. })
    }
}

/// A named group of metrics shown together (Fuerza, Movilidad, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: String,
    pub metrics: Vec<Metric>,
}

impl Section {
    pub fn new(name: &str, metrics: Vec<Metric>) -> Self {
        Section {
            name: name.to_string(),
            metrics,
        }
    }

    /// Columns in comparison-table order: every right/left pair first,
    /// followed by the total columns.
    pub fn table_columns(&self) -> Vec<&str> {
        let pairs = self
            .metrics
            .iter()
            .filter(|m| !m.is_total())
            .flat_map(|m| m.columns.columns());
        let totals = self
            .metrics
            .iter()
            .filter(|m| m.is_total())
            .flat_map(|m| m.columns.columns());
        pairs.chain(totals).collect()
    }

    /// Metrics flagged for the overview, at most `limit` of them.
    pub fn overview_metrics(&self, limit: usize) -> Vec<&Metric> {
        self.metrics.iter().filter(|m| m.overview).take(limit).collect()
    }

    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRegistry {
    sections: Vec<Section>,
}

impl MetricRegistry {
    pub fn new(sections: Vec<Section>) -> Result<Self, RegistryError> {
        if sections.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(MetricRegistry { sections })
    }

    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let sections = config
            .sections
            .iter()
            .map(section_from_config)
            .collect::<Result<Vec<_>, _>>()?;
        MetricRegistry::new(sections)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}

fn section_from_config(section: &SectionConfig) -> Result<Section, RegistryError> {
    let metrics = section
        .metrics
        .iter()
        .map(|m| metric_from_config(&section.name, m))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Section {
        name: section.name.clone(),
        metrics,
    })
}

fn metric_from_config(section: &str, metric: &MetricConfig) -> Result<Metric, RegistryError> {
    let columns = match (&metric.right, &metric.left, &metric.total) {
        (Some(right), Some(left), None) => MetricColumns::Bilateral {
            right: right.clone(),
            left: left.clone(),
        },
        (None, None, Some(total)) => MetricColumns::Total {
            column: total.clone(),
        },
        _ => {
            return Err(RegistryError::InvalidColumns {
                section: section.to_string(),
                metric: metric.name.clone(),
            })
        }
    };
    Ok(Metric {
        name: metric.name.clone(),
        columns,
        overview: metric.overview,
    })
}
