// Tracing setup: logs go to a file because the terminal belongs to the dashboard.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str =
    "perfil=info,perfil_core=info,perfil_eval=info,perfil_tui=info,warn";

/// Log file written under `<base_dir>/logs/`.
pub const LOG_FILE: &str = "perfil.log";

/// Install a global `fmt` subscriber writing to `<base_dir>/logs/perfil.log`.
///
/// Returns the path of the log file.
pub fn init_tracing(base_dir: &Path) -> anyhow::Result<PathBuf> {
    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;

    let log_path = log_dir.join(LOG_FILE);
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create {}", log_path.display()))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(log_path)
}
