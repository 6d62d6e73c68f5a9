// Application state: the loaded sheet, the metric registry and the report
// cache, plus the operations both the dashboard and the one-shot
// subcommands run against them.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use perfil_core::config::{self, Config};
use perfil_eval::cache::{ReportCache, SelectionKey};
use perfil_eval::dataset::Dataset;
use perfil_eval::export::{build_context, export_report, ExportedReport};
use perfil_eval::metrics::MetricRegistry;
use perfil_eval::population::category_population;
use perfil_eval::report::{AthleteReport, GroupReport, ReportBuilder, ReportError, ReportOptions};
use tracing::info;

/// Commands produced by keyboard input and handled by the dashboard loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Quit,
    /// The category changed; the athlete list must be rebuilt.
    CategoryChanged,
    /// Athlete, section or view changed.
    Refresh,
    Export,
}

/// A category as listed in pickers and by `perfil categories`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub label: String,
    pub athletes: usize,
}

pub struct App {
    pub base_dir: PathBuf,
    pub config: Config,
    pub dataset: Dataset,
    pub registry: MetricRegistry,
    cache: ReportCache,
}

fn report_builder<'a>(
    config: &Config,
    dataset: &'a Dataset,
    registry: &'a MetricRegistry,
) -> ReportBuilder<'a> {
    ReportBuilder::new(dataset, registry)
        .with_options(ReportOptions::from_config(config))
        .with_policy(config.reference.policy)
}

impl App {
    pub fn new(base_dir: &Path, config: Config, dataset: Dataset, registry: MetricRegistry) -> Self {
        App {
            base_dir: base_dir.to_path_buf(),
            config,
            dataset,
            registry,
            cache: ReportCache::new(),
        }
    }

    /// Load configuration, evaluation sheet and metric registry from
    /// `base_dir`, copying default config files on first run.
    pub fn load(base_dir: &Path) -> anyhow::Result<App> {
        let config = config::load_config_in(base_dir).context("failed to load configuration")?;
        info!(
            "config loaded: {} sections, reference policy {:?}",
            config.sections.len(),
            config.reference.policy
        );

        let dataset =
            Dataset::load(base_dir, &config).context("failed to load the evaluation sheet")?;
        info!(
            "loaded {} rows in {} categories",
            dataset.len(),
            dataset.categories().len()
        );

        let registry =
            MetricRegistry::from_config(&config).context("failed to build the metric registry")?;

        Ok(App::new(base_dir, config, dataset, registry))
    }

    pub fn builder(&self) -> ReportBuilder<'_> {
        report_builder(&self.config, &self.dataset, &self.registry)
    }

    pub fn categories(&self) -> Vec<CategoryEntry> {
        self.dataset
            .categories()
            .into_iter()
            .map(|name| CategoryEntry {
                name: name.to_string(),
                label: self.config.category_label(name).to_string(),
                athletes: category_population(&self.dataset, name).len(),
            })
            .collect()
    }

    pub fn athletes(&self, category: &str) -> Vec<String> {
        self.dataset
            .athletes_in(category)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn section_names(&self) -> Vec<String> {
        self.registry
            .section_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Individual profile, served from the cache when the selection has not
    /// changed.
    pub fn athlete_report(
        &mut self,
        category: &str,
        athlete: &str,
        section: &str,
    ) -> Result<AthleteReport, ReportError> {
        self.cache.select(SelectionKey::new(category, athlete));
        let builder = report_builder(&self.config, &self.dataset, &self.registry);
        match self.cache.athlete_report(&builder, section) {
            Some(result) => result.cloned(),
            None => builder.athlete_report(category, athlete, section),
        }
    }

    pub fn group_report(&mut self, category: &str, section: &str) -> Result<GroupReport, ReportError> {
        let builder = report_builder(&self.config, &self.dataset, &self.registry);
        self.cache.group_report(&builder, category, section).cloned()
    }

    /// Assemble and write one athlete report. `out_dir` overrides
    /// `report.output_dir` (which is resolved against the base directory).
    pub fn export(
        &mut self,
        category: &str,
        athlete: &str,
        section: &str,
        out_dir: Option<&Path>,
        date: NaiveDate,
    ) -> anyhow::Result<ExportedReport> {
        let report = self
            .athlete_report(category, athlete, section)
            .with_context(|| format!("cannot build the '{section}' report for {athlete}"))?;
        let context = build_context(&report, self.config.category_label(category), date);
        let dir = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => self.base_dir.join(&self.config.report.output_dir),
        };
        export_report(&dir, &context)
            .with_context(|| format!("failed to export the report for {athlete}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfil_core::config::parse_config;
    use perfil_eval::dataset::AthleteRecord;

    const CONFIG: &str = r#"
[data]
evaluations_path = "data.csv"
athlete_column = "JUGADOR"
category_column = "categoria"
fallback_category = "Evaluacion_2910"

[category_labels]
A = "Primer Equipo"

[zscore]
min_population = 3
overview_limit = 5

[report]
output_dir = "reports"

[[sections]]
name = "Fuerza"

[[sections.metrics]]
name = "CUAD"
right = "R"
left = "L"
overview = true
"#;

    fn test_app() -> App {
        let config = parse_config(CONFIG).unwrap();
        let records = vec![
            AthleteRecord::new("Ana", "A").with("R", Some(10.0)).with("L", Some(12.0)),
            AthleteRecord::new("Bea", "A").with("R", Some(14.0)).with("L", Some(16.0)),
            AthleteRecord::new("Cami", "A").with("R", Some(18.0)).with("L", Some(20.0)),
            AthleteRecord::new("MEDIA", "A").with("R", Some(14.0)).with("L", Some(16.0)),
            AthleteRecord::new("Dani", "B").with("R", Some(9.0)).with("L", Some(9.0)),
        ];
        let dataset = Dataset::new(vec!["R".into(), "L".into()], records);
        let registry = MetricRegistry::from_config(&config).unwrap();
        App::new(Path::new("."), config, dataset, registry)
    }

    #[test]
    fn categories_carry_labels_and_counts() {
        let app = test_app();
        let categories = app.categories();
        assert_eq!(
            categories,
            vec![
                CategoryEntry {
                    name: "A".into(),
                    label: "Primer Equipo".into(),
                    athletes: 3,
                },
                CategoryEntry {
                    name: "B".into(),
                    label: "B".into(),
                    athletes: 1,
                },
            ]
        );
        assert_eq!(app.athletes("A"), vec!["Ana", "Bea", "Cami"]);
        assert_eq!(app.section_names(), vec!["Fuerza"]);
    }

    #[test]
    fn athlete_report_through_cache_matches_builder() {
        let mut app = test_app();
        let cached = app.athlete_report("A", "Cami", "Fuerza").unwrap();
        let fresh = app.builder().athlete_report("A", "Cami", "Fuerza").unwrap();
        assert_eq!(cached, fresh);
        assert_eq!(app.athlete_report("A", "Cami", "Fuerza").unwrap(), fresh);
    }

    #[test]
    fn group_report_uses_filtered_population() {
        let mut app = test_app();
        let group = app.group_report("A", "Fuerza").unwrap();
        assert_eq!(group.population_size, 3);
        assert!(app.group_report("A", "Movilidad").is_err());
    }

    #[test]
    fn export_writes_into_override_dir() {
        let mut app = test_app();
        let dir = std::env::temp_dir().join(format!("perfil_app_export_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        let written = app.export("A", "Bea", "Fuerza", Some(&dir), date).unwrap();
        assert!(written.html.starts_with(&dir));
        assert!(written.html.ends_with("bea_fuerza_20240105.html"));

        let err = app.export("A", "Nadie", "Fuerza", Some(&dir), date).unwrap_err();
        assert!(err.to_string().contains("Nadie"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
