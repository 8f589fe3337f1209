//! Config subcommand handlers.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};

use scholarly_config::{self as config, Config, StorageBackend};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

/// The config file this invocation reads and writes.
pub fn resolved_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

fn wizard(path: &std::path::Path) -> Result<Config, CliError> {
    eprintln!("Scholarly CLI configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    let mut cfg = Config::default();

    // 1. Storage backend
    let backends = &["Files on disk (recommended)", "In memory (nothing is kept)"];
    let backend = Select::new()
        .with_prompt("Where should records be stored?")
        .items(backends)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    cfg.storage.backend = if backend == 0 {
        StorageBackend::File
    } else {
        StorageBackend::Memory
    };

    // 2. Data directory
    if cfg.storage.backend == StorageBackend::File {
        let default_dir = config::default_data_dir().display().to_string();
        let dir: String = Input::new()
            .with_prompt("Data directory")
            .default(default_dir.clone())
            .interact_text()
            .map_err(prompt_err)?;
        if dir != default_dir {
            cfg.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    // 3. Trial length
    cfg.subscription.trial_days = Input::new()
        .with_prompt("Trial length (days)")
        .default(cfg.subscription.trial_days)
        .validate_with(|days: &i64| {
            if *days > 0 {
                Ok(())
            } else {
                Err("must be positive")
            }
        })
        .interact_text()
        .map_err(prompt_err)?;

    // 4. Links
    cfg.links.base_url = Input::new()
        .with_prompt("App URL for shared links")
        .default(cfg.links.base_url.clone())
        .interact_text()
        .map_err(prompt_err)?;
    cfg.links.production = Confirm::new()
        .with_prompt("Serve links under the production base path?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = resolved_path(global);

    match args.command {
        ConfigCommand::Init { defaults } => {
            if path.exists()
                && !super::util::confirm(
                    &format!("Overwrite existing config at {}?", path.display()),
                    global.yes,
                )?
            {
                return Ok(());
            }

            let cfg = if defaults {
                Config::default()
            } else {
                wizard(&path)?
            };
            // Reject settings the engine would refuse before writing them.
            config::to_engine_config(&cfg)?;
            config::save_config_to(&cfg, &path)?;

            if !global.quiet {
                eprintln!("Configuration written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_from(&path)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?} ({e})")),
                |_| path.display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
