mod cli_args;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log;
use std::path::Path;
use std::process;
use std::str::FromStr;

use cli_args::Cli;
use codepack_core::{AppError, Config, ReadErrorPolicy, TreeMode};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;
    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            // Configuration and argument errors are always shown, even with -q.
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::Io(_)) => 2,
        Some(AppError::FileRead { .. }) => 2,
        Some(AppError::FileWrite { .. }) => 2,
        Some(AppError::WalkDir(_)) => 2,
        Some(AppError::TreeCommand(_)) => 3,
        Some(AppError::InvalidArgument(_)) => 5,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(cli.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::debug!("Project root: {}", project_root.display());

    let config = load_config_for_command(&project_root, &cli)?;
    let format = cli.format.as_deref().unwrap_or("text");

    if cli.dry_run {
        log::debug!("Executing dry run...");
        let planned = codepack_core::plan_project(&project_root, &config)
            .context("Failed to plan the pack")?;
        return output::print_plan(&planned, format, quiet);
    }

    let summary = codepack_core::pack_project(&project_root, &config).with_context(|| {
        format!(
            "Failed to pack project into {}",
            config.output_path(&project_root).display()
        )
    })?;
    output::print_summary(&summary, format, quiet)
}

fn merge_config_with_cli_overrides(mut config: Config, cli: &Cli) -> Result<Config> {
    log::trace!("Applying CLI overrides to config...");

    let output_opts = &cli.output_opts;
    if let Some(file) = &output_opts.output {
        config.output.file = file.clone();
    }
    if let Some(mode) = &output_opts.tree {
        config.tree.mode = TreeMode::from_str(mode)?;
    }
    if output_opts.relative_paths {
        config.output.relative_paths = true;
    }
    if let Some(size) = &output_opts.max_file_size {
        config.files.max_file_size = Some(size.clone());
    }
    if output_opts.abort_on_read_error {
        config.files.on_read_error = ReadErrorPolicy::Abort;
    }

    let toggles = &cli.ignore_toggles;
    if toggles.disable_gitignore {
        config.general.use_gitignore = false;
    }
    if toggles.enable_gitignore {
        config.general.use_gitignore = true;
    }
    if toggles.disable_builtin_rules {
        config.general.enable_builtin_rules = false;
    }
    if toggles.enable_builtin_rules {
        config.general.enable_builtin_rules = true;
    }
    if toggles.no_init_ignore {
        config.general.generate_ignore_file = false;
    }

    // Fail on a bad size string before anything touches the disk.
    config.get_max_file_size()?;

    log::trace!("Config after CLI overrides: {:?}", config);
    Ok(config)
}

fn load_config_for_command(project_root: &Path, cli: &Cli) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        project_root,
        cli.project_config.config_file.as_ref(),
        cli.project_config.disable_config_file,
    )
    .context("Failed to resolve configuration path")?;

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    merge_config_with_cli_overrides(config, cli)
}
