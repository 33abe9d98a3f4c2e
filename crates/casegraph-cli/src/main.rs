//! Casegraph CLI - relationship and cross-case analytics from the command line.

use casegraph_analytics::Analyzer;
use casegraph_cli::commands;
use casegraph_cli::{Cli, Command, Config, Formatter};
use casegraph_store::SqliteStore;
use clap::Parser;
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Log to stderr so JSON output stays clean
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> casegraph_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let database = match cli.database {
        Some(path) => path,
        None => config.database_path()?,
    };
    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut store = SqliteStore::new(&database)?;
    let analyzer = Analyzer::new(config.analytics.clone());

    match cli.command {
        Command::Seed => commands::execute_seed(&mut store, &formatter)?,
        Command::Degree(args) => commands::execute_degree(args, &store, &analyzer, &formatter)?,
        Command::Risk(args) => commands::execute_risk(args, &store, &analyzer, &formatter)?,
        Command::Hubs(args) => commands::execute_hubs(args, &store, &analyzer, &formatter)?,
        Command::MultiCase => commands::execute_multi_case(&store, &analyzer, &formatter)?,
        Command::Graph(args) => commands::execute_graph(args, &store, &analyzer, &formatter)?,
        Command::Clusters(args) => commands::execute_clusters(args, &store, &analyzer, &formatter)?,
        Command::Patterns(args) => commands::execute_patterns(args, &store, &analyzer, &formatter)?,
        Command::Related(args) => commands::execute_related(args, &store, &analyzer, &formatter)?,
        Command::Stats(args) => commands::execute_stats(args, &store, &analyzer, &formatter)?,
        Command::Dashboard(args) => commands::execute_dashboard(args, &store, &analyzer, &formatter)?,
        Command::Gaps(args) => commands::execute_gaps(args, &store, &analyzer, &formatter)?,
        Command::Timeline(args) => commands::execute_timeline(args, &store, &analyzer, &formatter)?,
        Command::Temporal(args) => commands::execute_temporal(args, &store, &analyzer, &formatter)?,
    }

    Ok(())
}
