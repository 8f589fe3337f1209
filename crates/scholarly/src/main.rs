mod cli;
mod commands;
mod error;
mod output;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, ValueEnum};
use tracing_subscriber::EnvFilter;

use scholarly_config::StorageBackend;
use scholarly_core::Engine;

use crate::cli::{Cli, ColorMode, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let matches = Cli::command().get_matches();
    let mut cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Config-file defaults fill in flags the user left unset
    apply_config_defaults(&mut cli.global, &matches);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Take `--output` / `--color` from the config file's `[defaults]` when
/// neither the flag nor its environment variable was given. A config
/// that fails to load is reported later by the command that needs it.
fn apply_config_defaults(global: &mut GlobalOpts, matches: &ArgMatches) {
    let path = commands::config_cmd::resolved_path(global);
    let Ok(cfg) = scholarly_config::load_config_from(&path) else {
        return;
    };

    if matches.value_source("output") == Some(ValueSource::DefaultValue) {
        match OutputFormat::from_str(&cfg.defaults.output, true) {
            Ok(format) => global.output = format,
            Err(_) => tracing::warn!(value = %cfg.defaults.output, "ignoring unknown default output format"),
        }
    }
    if matches.value_source("color") == Some(ValueSource::DefaultValue) {
        match ColorMode::from_str(&cfg.defaults.color, true) {
            Ok(mode) => global.color = mode,
            Err(_) => tracing::warn!(value = %cfg.defaults.color, "ignoring unknown default color mode"),
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't open the store
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "scholarly", &mut std::io::stdout());
            Ok(())
        }

        // All other commands work against the store
        cmd => {
            let engine = build_engine(&cli.global)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &engine, &cli.global).await
        }
    }
}

/// Build the engine from the config file with CLI overrides applied.
fn build_engine(global: &GlobalOpts) -> Result<Engine, CliError> {
    let path = commands::config_cmd::resolved_path(global);
    let mut cfg = scholarly_config::load_config_from(&path)?;
    if global.memory {
        cfg.storage.backend = StorageBackend::Memory;
    } else if global.data_dir.is_some() {
        cfg.storage.backend = StorageBackend::File;
    }
    Ok(scholarly_config::build_engine(
        &cfg,
        global.data_dir.as_deref(),
    )?)
}
