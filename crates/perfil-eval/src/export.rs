// Report context, HTML table rendering and on-disk export.
//
// The context is what a PDF renderer consumes: athlete, category, date,
// section, chart series and pre-rendered tables. Turning the HTML into a PDF
// happens outside this crate.

use chrono::NaiveDate;
use handlebars::Handlebars;
use html_escape::encode_text;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::chart::ChartSeries;
use crate::report::{AthleteReport, RowFlag};
use crate::stats::round_to;
use crate::zscore::ZScoreSet;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize report context: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid report template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("failed to render report: {0}")]
    Render(#[from] handlebars::RenderError),
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportContext {
    pub athlete_name: String,
    /// Display label of the athlete's category.
    pub category: String,
    /// Formatted `dd/mm/YYYY`.
    pub date: String,
    pub section: String,
    pub charts: Vec<ChartSeries>,
    pub tables_html: Vec<String>,
    #[serde(skip)]
    file_date: String,
}

impl ReportContext {
    /// File name stem: `<athlete>_<section>_<yyyymmdd>`.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_{}",
            slugify(&self.athlete_name),
            slugify(&self.section),
            self.file_date
        )
    }
}

pub fn build_context(report: &AthleteReport, category_label: &str, date: NaiveDate) -> ReportContext {
    let mut charts = Vec::new();
    if !report.bars.is_empty() {
        charts.push(ChartSeries::Bilateral(report.bars.clone()));
    }
    if !report.radar.labels.is_empty() {
        charts.push(ChartSeries::Radar(report.radar.clone()));
    }

    ReportContext {
        athlete_name: report.athlete.clone(),
        category: category_label.to_string(),
        date: date.format("%d/%m/%Y").to_string(),
        section: report.section.clone(),
        charts,
        tables_html: vec![zscore_table_html(&report.overview), comparison_table_html(report)],
        file_date: date.format("%Y%m%d").to_string(),
    }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

fn fmt_value(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, round_to(v, decimals as i32)),
        None => "N/A".to_string(),
    }
}

/// Z-score overview: metric, raw value, Z-score and band. An empty set
/// renders a single "insufficient data" row.
pub fn zscore_table_html(set: &ZScoreSet) -> String {
    let mut html = String::from(
        "<table class=\"metric-table\">\n<thead><tr><th>Metric</th><th>Value</th><th>Z-score</th><th>Band</th></tr></thead>\n<tbody>\n",
    );
    if set.is_insufficient() {
        let _ = writeln!(
            html,
            "<tr><td colspan=\"4\">Insufficient data: fewer than {} athletes with values</td></tr>",
            set.min_population
        );
    }
    for entry in &set.entries {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            encode_text(&entry.metric),
            fmt_value(entry.value, 1),
            fmt_value(entry.zscore, 2),
            entry.band.label()
        );
    }
    html.push_str("</tbody>\n</table>");
    html
}

/// Comparison table: athlete value against population mean and std.
pub fn comparison_table_html(report: &AthleteReport) -> String {
    let mut html = String::from(
        "<table class=\"metric-table\">\n<thead><tr><th>Metric</th><th>Athlete</th><th>Mean</th><th>SD</th></tr></thead>\n<tbody>\n",
    );
    for row in &report.rows {
        let stats = row.reference.rounded();
        let note = match row.flag {
            Some(RowFlag::MissingPopulationColumn) => " *",
            Some(RowFlag::NoPopulationValues) => " **",
            None => "",
        };
        let _ = writeln!(
            html,
            "<tr><td>{}{}</td><td>{}</td><td>{:.1}</td><td>{:.1}</td></tr>",
            encode_text(&row.column),
            note,
            fmt_value(row.athlete_value, 1),
            stats.mean,
            stats.std
        );
    }
    html.push_str("</tbody>\n</table>");
    if report.rows.iter().any(|r| r.flag.is_some()) {
        html.push_str(
            "\n<p class=\"table-note\">* not in the reference population; ** no reference values</p>",
        );
    }
    html
}

const REPORT_TEMPLATE: &str = include_str!("../templates/report.html.hbs");

/// Standalone HTML document for the PDF renderer. Context fields are
/// escaped by the template; the pre-rendered tables are inserted as is.
pub fn render_report_html(context: &ReportContext) -> Result<String, ExportError> {
    let mut templates = Handlebars::new();
    templates.set_strict_mode(true);
    templates.register_template_string("report", REPORT_TEMPLATE)?;
    Ok(templates.render("report", context)?)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Lowercase slug: letters and digits kept (accented ones included), runs of
/// anything else become one underscore.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending && !out.is_empty() {
                out.push('_');
            }
            pending = false;
            out.extend(c.to_lowercase());
        } else {
            pending = true;
        }
    }
    if out.is_empty() {
        out.push_str("report");
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    pub html: PathBuf,
    pub json: PathBuf,
}

/// Write `<stem>.html` and `<stem>.json` into `dir`, creating it if needed.
/// Existing files with the same name are replaced.
pub fn export_report(dir: &Path, context: &ReportContext) -> Result<ExportedReport, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let stem = context.file_stem();
    let html = dir.join(format!("{stem}.html"));
    let json = dir.join(format!("{stem}.json"));

    fs::write(&html, render_report_html(context)?).map_err(|source| ExportError::Write {
        path: html.clone(),
        source,
    })?;
    let body = serde_json::to_string_pretty(context)?;
    fs::write(&json, body).map_err(|source| ExportError::Write {
        path: json.clone(),
        source,
    })?;

    info!("exported report to {}", html.display());
    Ok(ExportedReport { html, json })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
