// Evaluation sheet loading and normalization.
//
// Reads a CSV export of the evaluation spreadsheet: one row per athlete
// evaluation, an athlete-name column, an optional category column, and one
// column per metric side (plus optional bilateral totals). Legacy headers are
// renamed through the configured alias table, and every metric cell is
// coerced to a number or to "missing".

use perfil_core::config::Config;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::population::is_athlete_name;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error(
        "could not open evaluation sheet {path}: {source} \
         (export the sheet to CSV at this path or set data.evaluations_path)"
    )]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("column '{column}' not found in {path} (check data.athlete_column and column_aliases)")]
    MissingColumn { path: String, column: String },

    #[error("{path} contains no evaluation rows")]
    Empty { path: String },
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One evaluation row. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AthleteRecord {
    pub name: Option<String>,
    pub category: Option<String>,
    /// Column -> coerced value. A key with `None` means the column exists
    /// but the cell was blank or non-numeric.
    values: BTreeMap<String, Option<f64>>,
}

impl AthleteRecord {
    pub fn new(name: &str, category: &str) -> Self {
        AthleteRecord {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            values: BTreeMap::new(),
        }
    }

    /// Builder used by loaders and tests.
    pub fn with(mut self, column: &str, value: Option<f64>) -> Self {
        self.values.insert(column.to_string(), value);
        self
    }

    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied().flatten()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// The loaded evaluation table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<AthleteRecord>,
}

/// Column naming used while reading the sheet.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub athlete_column: String,
    pub category_column: String,
    pub fallback_category: String,
    pub aliases: BTreeMap<String, String>,
}

impl LoadOptions {
    pub fn from_config(config: &Config) -> Self {
        LoadOptions {
            athlete_column: config.data.athlete_column.clone(),
            category_column: config.data.category_column.clone(),
            fallback_category: config.data.fallback_category.clone(),
            aliases: config.column_aliases.clone(),
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            athlete_column: "JUGADOR".into(),
            category_column: "categoria".into(),
            fallback_category: "Evaluacion_2910".into(),
            aliases: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Coerce a raw cell to a finite number. Blank, non-numeric and non-finite
/// cells become `None`. A lone decimal comma ("12,5") is accepted.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = trimmed.parse::<f64>().ok().or_else(|| {
        if trimmed.contains(',') && !trimmed.contains('.') {
            trimmed.replacen(',', ".", 1).parse::<f64>().ok()
        } else {
            None
        }
    });
    parsed.filter(|v| v.is_finite())
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Make repeated headers unique by suffixing `.1`, `.2`, ... to later copies,
/// skipping any suffix another header already uses. Legacy sheets repeat the
/// CMJ force headers, and the alias table keys the second copy as `<name>.1`.
pub fn dedup_headers(raw: &[&str]) -> Vec<String> {
    let mut taken: HashSet<String> = raw.iter().map(|h| h.to_string()).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());
    for h in raw {
        let count = counts.entry(*h).or_insert(0);
        if *count == 0 {
            *count = 1;
            out.push(h.to_string());
            continue;
        }
        let mut candidate = format!("{h}.{count}");
        while taken.contains(&candidate) {
            *count += 1;
            candidate = format!("{h}.{count}");
        }
        *count += 1;
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<AthleteRecord>) -> Self {
        Dataset { columns, records }
    }

    /// Load the evaluation sheet configured in `data.evaluations_path`,
    /// resolved against `base_dir`.
    pub fn load(base_dir: &Path, config: &Config) -> Result<Dataset, DatasetError> {
        let path = base_dir.join(&config.data.evaluations_path);
        Dataset::load_path(&path, &LoadOptions::from_config(config))
    }

    pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Dataset, DatasetError> {
        let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Dataset::from_reader(file, &path.display().to_string(), options)
    }

    /// Read from any CSV source. `origin` names the source in errors.
    pub fn from_reader<R: Read>(
        rdr: R,
        origin: &str,
        options: &LoadOptions,
    ) -> Result<Dataset, DatasetError> {
        let csv_err = |e: csv::Error| DatasetError::Csv {
            path: origin.to_string(),
            source: e,
        };

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);

        let raw: Vec<&str> = reader.headers().map_err(csv_err)?.iter().map(str::trim).collect();
        let headers: Vec<String> = dedup_headers(&raw)
            .into_iter()
            .map(|h| options.aliases.get(&h).cloned().unwrap_or(h))
            .collect();

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            if let Some(first) = seen.insert(h.as_str(), i) {
                warn!("duplicate column '{}' (positions {} and {}); the later one wins", h, first, i);
            }
        }

        let athlete_idx = headers
            .iter()
            .position(|h| *h == options.athlete_column)
            .ok_or_else(|| DatasetError::MissingColumn {
                path: origin.to_string(),
                column: options.athlete_column.clone(),
            })?;
        let category_idx = headers.iter().position(|h| *h == options.category_column);
        if category_idx.is_none() {
            debug!(
                "no '{}' column in {}; assigning every row to '{}'",
                options.category_column, origin, options.fallback_category
            );
        }

        let metric_columns: Vec<(usize, &String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != athlete_idx && Some(*i) != category_idx && !h.is_empty())
            .collect();

        let mut records = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!("skipping malformed row {} in {}: {}", line + 2, origin, e);
                    continue;
                }
            };
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let name = row.get(athlete_idx).and_then(non_blank);
            let category = match category_idx {
                Some(idx) => row.get(idx).and_then(non_blank),
                None => Some(options.fallback_category.clone()),
            };

            let mut values = BTreeMap::new();
            for (idx, column) in &metric_columns {
                let value = row.get(*idx).and_then(coerce_numeric);
                values.insert((*column).clone(), value);
            }

            records.push(AthleteRecord {
                name,
                category,
                values,
            });
        }

        if records.is_empty() {
            return Err(DatasetError::Empty {
                path: origin.to_string(),
            });
        }

        let columns = metric_columns.into_iter().map(|(_, h)| h.clone()).collect();
        debug!("loaded {} rows from {}", records.len(), origin);
        Ok(Dataset { columns, records })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl Dataset {
    pub fn records(&self) -> &[AthleteRecord] {
        &self.records
    }

    /// Metric columns present in the sheet, in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct categories in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for category in self.records.iter().filter_map(|r| r.category.as_deref()) {
            if !out.contains(&category) {
                out.push(category);
            }
        }
        out
    }

    /// Category with the most rows (summary rows included). Ties resolve to
    /// the category seen first.
    pub fn largest_category(&self) -> Option<&str> {
        let categories = self.categories();
        let mut best: Option<(&str, usize)> = None;
        for category in categories {
            let count = self
                .records
                .iter()
                .filter(|r| r.category.as_deref() == Some(category))
                .count();
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((category, count));
            }
        }
        best.map(|(category, _)| category)
    }

    /// Real athlete names in a category, de-duplicated, in sheet order.
    pub fn athletes_in(&self, category: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for record in &self.records {
            if record.category.as_deref() != Some(category) {
                continue;
            }
            if let Some(name) = record.name.as_deref() {
                if is_athlete_name(name) && !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        out
    }

    /// First row for the given athlete in the given category.
    pub fn find_athlete(&self, category: &str, name: &str) -> Option<&AthleteRecord> {
        self.records.iter().find(|r| {
            r.category.as_deref() == Some(category) && r.name.as_deref() == Some(name)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
