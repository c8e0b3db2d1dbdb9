mod artifact;
mod cli;
mod commands;
mod error_fmt;
mod logging;

use clap::Parser;
use cli::{Cli, Commands, JSON_MODE};
use error_fmt::{ConfigError, exit_code_for_error, format_error_json, humanize};
use eyre::{Result, WrapErr};
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        if cli::json_mode() {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn load_config(path: Option<&Path>) -> Result<thermo_config::Config> {
    let Some(path) = path else {
        return Ok(thermo_config::Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))
        .map_err(|e| ConfigError(format!("{e:#}")))?;
    let cfg = thermo_config::load_toml(&text).map_err(|e| ConfigError(e.to_string()))?;
    cfg.validate().map_err(|e| ConfigError(e.to_string()))?;
    Ok(cfg)
}

fn run(cli: Cli) -> Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    logging::init(&cli.log_level, cli.json, &cfg.logging)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match cli.cmd {
        Commands::Generate {
            days,
            readings_per_hour,
            seed,
            end,
            sensor_id,
            output,
        } => commands::generate::run(
            cli.json,
            &commands::generate::GenerateArgs {
                days,
                readings_per_hour,
                seed,
                end: end.as_deref(),
                sensor_id: &sensor_id,
                output: &output,
            },
        ),
        Commands::Dedup { input, output } => commands::dedup::run(&cfg, cli.json, input, &output),
        Commands::Preprocess { input, output } => {
            commands::preprocess::run(&cfg, cli.json, input, &output)
        }
        Commands::Train { input, output_dir } => {
            commands::train::run(&cfg, cli.json, input, &output_dir)
        }
        Commands::Forecast {
            model,
            input,
            horizons,
        } => commands::forecast::run(&cfg, &model, input, horizons),
    }
}
