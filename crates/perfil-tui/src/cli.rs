// Command-line surface and the plain-text output of the one-shot commands.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use perfil_eval::report::{AthleteReport, GroupReport};

use crate::app::CategoryEntry;

#[derive(Parser, Debug)]
#[command(author, version, about = "Athlete evaluation dashboard", long_about = None)]
pub struct Cli {
    /// Base directory containing defaults/, config/ and the data files
    #[arg(long, global = true, default_value = ".", value_hint = ValueHint::DirPath)]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Interactive terminal dashboard (default)
    Dashboard,
    /// Assemble one athlete report and export it as HTML and JSON
    Report(ReportArgs),
    /// Print the group profile of a category
    Group(GroupArgs),
    /// List categories and athlete counts
    Categories,
}

#[derive(Parser, Debug, PartialEq, Eq)]
pub struct ReportArgs {
    /// Raw category value as it appears in the sheet
    #[arg(long)]
    pub category: String,

    #[arg(long)]
    pub athlete: String,

    /// Metric section (e.g. Fuerza)
    #[arg(long)]
    pub section: String,

    /// Output directory (defaults to report.output_dir)
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug, PartialEq, Eq)]
pub struct GroupArgs {
    #[arg(long)]
    pub category: String,

    #[arg(long)]
    pub section: String,
}

impl Cli {
    pub fn command_or_default(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Dashboard)
    }
}

// ---------------------------------------------------------------------------
// Plain-text output
// ---------------------------------------------------------------------------

pub fn format_categories(categories: &[CategoryEntry]) -> String {
    let mut out = String::new();
    for c in categories {
        if c.label == c.name {
            let _ = writeln!(out, "{:<24} {:>3} athletes", c.name, c.athletes);
        } else {
            let _ = writeln!(
                out,
                "{:<24} {:>3} athletes  ({})",
                c.name, c.athletes, c.label
            );
        }
    }
    out
}

pub fn format_group_report(report: &GroupReport, category_label: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} - {} ({} athletes)",
        report.section, category_label, report.population_size
    );
    let _ = writeln!(
        out,
        "{:<26} {:>9} {:>8} {:>9} {:>9} {:>3}",
        "Metric", "Mean", "SD", "Min", "Max", "n"
    );
    for row in &report.rows {
        match row.summary {
            Some(s) => {
                let _ = writeln!(
                    out,
                    "{:<26} {:>9.1} {:>8.1} {:>9.1} {:>9.1} {:>3}",
                    row.column, s.mean, s.std, s.min, s.max, s.n
                );
            }
            None => {
                let _ = writeln!(out, "{:<26} {:>9} {:>8} {:>9} {:>9} {:>3}", row.column, "-", "-", "-", "-", 0);
            }
        }
    }
    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    out
}

/// Warnings of an athlete report, one per line.
pub fn format_warnings(report: &AthleteReport) -> String {
    report
        .warnings
        .iter()
        .map(|w| format!("warning: {w}\n"))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
