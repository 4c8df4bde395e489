use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use configurable_unit::{ConfigurableUnit, UnitOptions};
use unitkit_bootstrap::{AppConfig, CliArgs};

/// UnitKit Host - runs the configurable unit module
#[derive(Parser)]
#[command(name = "unitkit-host")]
#[command(about = "UnitKit Host - runs the configurable unit module")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the unit scenario
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Prepare CLI args that flow into the AppConfig merge logic.
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (UNITKIT__*) -> 4) CLI overrides
    // Also normalizes + creates app.home_dir.
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    unitkit_bootstrap::logging::init_logging(&logging_config, Path::new(&config.app.home_dir));

    tracing::info!("UnitKit Host starting");

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Dispatch subcommands (default: run)
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_unit(&config).await,
        Commands::Check => check_config(&config),
    }
}

/// Drive one unit through the whole surface: mutate, read, emit, and await
/// the deferred fetch.
async fn run_unit(config: &AppConfig) -> Result<()> {
    let options = unit_options(config)?;
    let mut unit = ConfigurableUnit::new(options);

    unit.increment(10);

    let primary = unit.primary().to_string();
    tracing::info!(%primary, "read primary value");
    println!("{primary}");

    unit.log_primary();

    let value = unit.fetch_data().await;
    tracing::info!(value, "deferred fetch resolved");
    println!("{value}");

    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration…");
    // Loading already normalized home_dir; make sure the unit options parse too.
    let _ = unit_options(config)?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

/// Pull the unit's options out of the per-module bag. An absent entry means
/// "all defaults"; a malformed entry is a hard error.
fn unit_options(config: &AppConfig) -> Result<UnitOptions> {
    match config.modules.get("configurable_unit") {
        Some(value) => UnitOptions::from_value(value)
            .context("configurable_unit configuration is invalid"),
        None => Ok(UnitOptions::default()),
    }
}
