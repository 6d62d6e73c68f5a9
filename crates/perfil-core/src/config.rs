// Configuration loading and parsing (config/dashboard.toml).

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the single configuration file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    /// Legacy column name -> current column name.
    #[serde(default)]
    pub column_aliases: BTreeMap<String, String>,
    /// Raw category value -> label shown in the dashboard.
    #[serde(default)]
    pub category_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub zscore: ZScoreConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub report: ReportConfig,
    pub sections: Vec<SectionConfig>,
}

impl Config {
    /// Display label for a raw category value, falling back to the value itself.
    pub fn category_label<'a>(&'a self, category: &'a str) -> &'a str {
        self.category_labels
            .get(category)
            .map(String::as_str)
            .unwrap_or(category)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub evaluations_path: String,
    #[serde(default = "default_athlete_column")]
    pub athlete_column: String,
    #[serde(default = "default_category_column")]
    pub category_column: String,
    /// Assigned to every row when the sheet carries no category column.
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,
}

fn default_athlete_column() -> String {
    "JUGADOR".into()
}

fn default_category_column() -> String {
    "categoria".into()
}

fn default_fallback_category() -> String {
    "Evaluacion_2910".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZScoreConfig {
    /// Minimum number of valid values a metric needs before it is Z-scored.
    pub min_population: usize,
    /// Maximum number of metrics shown in the compact overview.
    pub overview_limit: usize,
}

impl Default for ZScoreConfig {
    fn default() -> Self {
        ZScoreConfig {
            min_population: 3,
            overview_limit: 5,
        }
    }
}

/// Which population an athlete is standardized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// The athlete's own category.
    #[default]
    SelectedCategory,
    /// Whichever category has the most rows, regardless of the selection.
    LargestCategory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub policy: ReferencePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            output_dir: "reports".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionConfig {
    pub name: String,
    pub metrics: Vec<MetricConfig>,
}

/// One metric as written in the TOML file. Exactly one of the
/// (`right`, `left`) pair or `total` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricConfig {
    pub name: String,
    #[serde(default)]
    pub right: Option<String>,
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub overview: bool,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/dashboard.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer `load_config_in()` which does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration text without validating it.
pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or pass --config-dir",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Copy missing defaults into `base_dir/config`, then load from there.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.evaluations_path.trim().is_empty() {
        return Err(invalid("data.evaluations_path", "must not be empty"));
    }
    if config.data.athlete_column.trim().is_empty() {
        return Err(invalid("data.athlete_column", "must not be empty"));
    }

    if config.zscore.min_population < 2 {
        return Err(invalid(
            "zscore.min_population",
            format!(
                "must be at least 2 (a standard deviation needs two values), got {}",
                config.zscore.min_population
            ),
        ));
    }
    if config.zscore.overview_limit == 0 {
        return Err(invalid("zscore.overview_limit", "must be > 0"));
    }

    if config.sections.is_empty() {
        return Err(invalid("sections", "at least one section is required"));
    }

    let mut section_names = HashSet::new();
    for (i, section) in config.sections.iter().enumerate() {
        let field = format!("sections[{i}]");
        if section.name.trim().is_empty() {
            return Err(invalid(format!("{field}.name"), "must not be empty"));
        }
        if !section_names.insert(section.name.as_str()) {
            return Err(invalid(
                format!("{field}.name"),
                format!("duplicate section name '{}'", section.name),
            ));
        }
        if section.metrics.is_empty() {
            return Err(invalid(
                format!("{field}.metrics"),
                format!("section '{}' has no metrics", section.name),
            ));
        }

        let mut metric_names = HashSet::new();
        for (j, metric) in section.metrics.iter().enumerate() {
            let mfield = format!("{field}.metrics[{j}]");
            if metric.name.trim().is_empty() {
                return Err(invalid(format!("{mfield}.name"), "must not be empty"));
            }
            if !metric_names.insert(metric.name.as_str()) {
                return Err(invalid(
                    format!("{mfield}.name"),
                    format!("duplicate metric name '{}'", metric.name),
                ));
            }
            match (&metric.right, &metric.left, &metric.total) {
                (Some(_), Some(_), None) | (None, None, Some(_)) => {}
                (Some(_), None, None) | (None, Some(_), None) => {
                    return Err(invalid(
                        mfield,
                        format!("metric '{}' needs both `right` and `left`", metric.name),
                    ));
                }
                _ => {
                    return Err(invalid(
                        mfield,
                        format!(
                            "metric '{}' must set either `right` + `left` or `total`",
                            metric.name
                        ),
                    ));
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Repository root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    fn defaults_text() -> String {
        fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE))
            .expect("defaults/dashboard.toml should exist")
    }

    /// Fresh temp dir containing `config/dashboard.toml` with the given text.
    fn temp_with_config(name: &str, text: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), text).unwrap();
        tmp
    }

    const MINIMAL: &str = r#"
[data]
evaluations_path = "data/evaluaciones.csv"

[[sections]]
name = "Movilidad"

[[sections.metrics]]
name = "AKE"
right = "AKE DER"
left = "AKE IZQ"
"#;

    #[test]
    fn load_shipped_defaults() {
        let config = parse_config(&defaults_text()).expect("defaults should parse");
        validate(&config).expect("defaults should validate");

        assert_eq!(config.data.athlete_column, "JUGADOR");
        assert_eq!(config.data.category_column, "categoria");
        assert_eq!(config.zscore.min_population, 3);
        assert_eq!(config.zscore.overview_limit, 5);
        assert_eq!(config.reference.policy, ReferencePolicy::SelectedCategory);
        assert_eq!(
            config.column_aliases.get("CUAD 70° Der").map(String::as_str),
            Some("CUAD DER (N)")
        );
        let names: Vec<&str> = config.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Fuerza", "Movilidad", "Funcionalidad"]);
        assert_eq!(config.category_label("Evaluacion_2910"), "Primer Equipo");
        assert_eq!(config.category_label("Reserva"), "Reserva");
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let tmp = temp_with_config("perfil_config_minimal", MINIMAL);
        let config = load_config_from(&tmp).expect("minimal config should load");
        assert_eq!(config.data.fallback_category, "Evaluacion_2910");
        assert_eq!(config.zscore.min_population, 3);
        assert_eq!(config.report.output_dir, "reports");
        assert!(config.column_aliases.is_empty());
        assert!(!config.sections[0].metrics[0].overview);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_config_file_is_reported() {
        let tmp = std::env::temp_dir().join("perfil_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        match load_config_from(&tmp) {
            Err(ConfigError::FileNotFound { path }) => {
                assert!(path.ends_with("config/dashboard.toml"));
            }
            other => panic!("expected FileNotFound, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let tmp = temp_with_config("perfil_config_malformed", "[data\nevaluations_path = 1");
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ParseError { .. })
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_min_population_below_two() {
        let text = format!("{MINIMAL}\n[zscore]\nmin_population = 1\noverview_limit = 5\n");
        let config = parse_config(&text).unwrap();
        match validate(&config) {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "zscore.min_population");
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_half_bilateral_metric() {
        let text = MINIMAL.replace("left = \"AKE IZQ\"\n", "");
        let config = parse_config(&text).unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("needs both"), "{err}");
    }

    #[test]
    fn rejects_metric_with_pair_and_total() {
        let text = MINIMAL.replace("left = \"AKE IZQ\"", "left = \"AKE IZQ\"\ntotal = \"AKE\"");
        let config = parse_config(&text).unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("either"), "{err}");
    }

    #[test]
    fn rejects_duplicate_metric_names() {
        let text = format!(
            "{MINIMAL}\n[[sections.metrics]]\nname = \"AKE\"\ntotal = \"AKE TOTAL\"\n"
        );
        let config = parse_config(&text).unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate metric"), "{err}");
    }

    #[test]
    fn rejects_section_without_metrics() {
        let text = format!("{MINIMAL}\n[[sections]]\nname = \"Vacia\"\nmetrics = []\n");
        let config = parse_config(&text).unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("has no metrics"), "{err}");
    }

    #[test]
    fn parses_largest_category_policy() {
        let text = format!("{MINIMAL}\n[reference]\npolicy = \"largest_category\"\n");
        let config = parse_config(&text).unwrap();
        assert_eq!(config.reference.policy, ReferencePolicy::LargestCategory);
    }

    #[test]
    fn ensure_config_files_copies_once_and_skips_examples() {
        let tmp = std::env::temp_dir().join("perfil_config_ensure");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), MINIMAL).unwrap();
        fs::write(tmp.join("defaults").join("local.toml.example"), "x = 1").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied.len(), 1);
        assert!(!tmp.join("config").join("local.toml.example").exists());

        // A user edit must survive a second pass.
        fs::write(tmp.join("config").join(CONFIG_FILE), "# edited").unwrap();
        let copied = ensure_config_files(&tmp).unwrap();
        assert!(copied.is_empty());
        assert_eq!(
            fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap(),
            "# edited"
        );
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_without_any_directory_fails() {
        let tmp = std::env::temp_dir().join("perfil_config_nothing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        assert!(matches!(
            ensure_config_files(&tmp),
            Err(ConfigError::DefaultsCopyError { .. })
        ));
        let _ = fs::remove_dir_all(&tmp);
    }
}
