// perfil entry point.
//
// Startup sequence:
// 1. Parse the command line
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config, evaluation sheet and metric registry
// 4. Dispatch the subcommand (the dashboard by default)

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use perfil_core::logging;
use perfil_tui::app::App;
use perfil_tui::cli::{self, Cli, Command};
use perfil_tui::tui;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = logging::init_tracing(&cli.config_dir)?;
    info!("perfil starting up (log file {})", log_path.display());

    let mut app = App::load(&cli.config_dir)?;

    match cli.command_or_default() {
        Command::Dashboard => {
            if let Err(e) = tui::run(&mut app) {
                error!("TUI error: {:#}", e);
                return Err(e);
            }
        }
        Command::Report(args) => {
            let report = app
                .athlete_report(&args.category, &args.athlete, &args.section)
                .with_context(|| format!("cannot build the report for {}", args.athlete))?;
            eprint!("{}", cli::format_warnings(&report));

            let today = chrono::Local::now().date_naive();
            let written = app.export(
                &args.category,
                &args.athlete,
                &args.section,
                args.out.as_deref(),
                today,
            )?;
            println!("{}", written.html.display());
            println!("{}", written.json.display());
        }
        Command::Group(args) => {
            let report = app
                .group_report(&args.category, &args.section)
                .with_context(|| format!("cannot build the group profile for {}", args.category))?;
            print!(
                "{}",
                cli::format_group_report(&report, app.config.category_label(&args.category))
            );
        }
        Command::Categories => {
            print!("{}", cli::format_categories(&app.categories()));
        }
    }

    info!("perfil shut down cleanly");
    Ok(())
}
