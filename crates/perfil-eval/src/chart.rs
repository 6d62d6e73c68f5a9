// Chart-ready series handed to whatever draws the figures.

use serde::Serialize;

use crate::dataset::AthleteRecord;
use crate::metrics::{Metric, MetricColumns};
use crate::zscore::ZScoreSet;

/// Limb symmetry index: the smaller side as a percentage of the larger.
/// Only defined when both sides are positive.
pub fn lsi(right: f64, left: f64) -> Option<f64> {
    if right > 0.0 && left > 0.0 {
        Some(right.min(left) / right.max(left) * 100.0)
    } else {
        None
    }
}

/// Grouped right/left bars, one group per metric. Totals occupy the right
/// bar with an empty left bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BilateralChart {
    pub labels: Vec<String>,
    pub right: Vec<f64>,
    pub left: Vec<f64>,
    pub lsi: Vec<Option<f64>>,
    /// True for total metrics, which have no left bar.
    pub totals: Vec<bool>,
}

impl BilateralChart {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Build the bar series for an athlete. Missing cells are drawn as zero.
pub fn bilateral_chart(record: &AthleteRecord, metrics: &[Metric]) -> BilateralChart {
    let mut chart = BilateralChart {
        labels: Vec::with_capacity(metrics.len()),
        right: Vec::with_capacity(metrics.len()),
        left: Vec::with_capacity(metrics.len()),
        lsi: Vec::with_capacity(metrics.len()),
        totals: Vec::with_capacity(metrics.len()),
    };
    for metric in metrics {
        let (right, left, symmetry) = match &metric.columns {
            MetricColumns::Bilateral { right, left } => {
                let r = record.value(right).unwrap_or(0.0);
                let l = record.value(left).unwrap_or(0.0);
                (r, l, lsi(r, l))
            }
            MetricColumns::Total { column } => (record.value(column).unwrap_or(0.0), 0.0, None),
        };
        chart.labels.push(metric.name.clone());
        chart.right.push(right);
        chart.left.push(left);
        chart.lsi.push(symmetry);
        chart.totals.push(metric.is_total());
    }
    chart
}

/// Radar series for the compact Z-score overview. Only defined scores are
/// plotted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub labels: Vec<String>,
    pub zscores: Vec<f64>,
    pub values: Vec<f64>,
    pub means: Vec<f64>,
}

pub fn radar_chart(set: &ZScoreSet) -> RadarChart {
    let mut chart = RadarChart {
        labels: Vec::new(),
        zscores: Vec::new(),
        values: Vec::new(),
        means: Vec::new(),
    };
    for entry in &set.entries {
        let (Some(z), Some(value)) = (entry.zscore, entry.value) else {
            continue;
        };
        chart.labels.push(entry.metric.clone());
        chart.zscores.push(z);
        chart.values.push(value);
        chart.means.push(entry.reference.mean);
    }
    chart
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSeries {
    Bilateral(BilateralChart),
    Radar(RadarChart),
}
