//! Application driver.
//! Loads/merges config, handles the informational flags, refuses unsupported
//! platforms, initializes logging and runs either a restore or a relocation.

use anyhow::{Context, Result};
use std::process::ExitCode;

use folder_relocator::cli::Args;
use folder_relocator::config::{self, Config, LoadResult, CONFIG_ENV};
use folder_relocator::output as out;
use folder_relocator::platform;

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    // Informational flags run before logging init
    if args.print_config {
        print_config_location();
        return Ok(ExitCode::SUCCESS);
    }

    if args.init_config {
        let path = config::default_config_path()?;
        config::create_template_config(&path)?;
        out::print_success(&format!("A template config was written to: {}", path.display()));
        out::print_info("Edit `target_base` and `folders`, then re-run without --init-config.");
        return Ok(ExitCode::SUCCESS);
    }

    let (mut cfg, cfg_path) = match config::load_config()? {
        LoadResult::Loaded { path, config } => (config, Some(path)),
        LoadResult::Missing(_) => (Config::default(), None),
    };
    args.apply_overrides(&mut cfg);

    if args.list_folders {
        out::print_user(out::render_folder_table(current_location).trim_end());
        return Ok(ExitCode::SUCCESS);
    }

    platform::ensure_supported()?;

    let guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json)
        .context("initialize logging")?;
    tracing::debug!(config = ?cfg_path, "starting folder_relocator: {:?}", args);

    let result = relocate_here(&args, &cfg);

    // Flush the file appender before the process exits
    drop(guard);
    result
}

fn print_config_location() {
    if let Some(v) = std::env::var_os(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {}\n", v.to_string_lossy()));
    }
    match config::default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run with --init-config to create a template.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a config path: {e:#}")),
    }
}

#[cfg(windows)]
fn current_location(name: &str) -> Option<String> {
    use folder_relocator::registry::ShellFolderStore;
    let folder = folder_relocator::known_folders::lookup(name)?;
    platform::RegistryShellFolders
        .current_location(folder)
        .ok()
        .map(|p| p.display().to_string())
}

#[cfg(not(windows))]
fn current_location(_name: &str) -> Option<String> {
    None
}

#[cfg(windows)]
fn relocate_here(args: &Args, cfg: &Config) -> Result<ExitCode> {
    use anyhow::anyhow;
    use folder_relocator::errors::RelocateError;
    use folder_relocator::fs_ops::{StreamingCopier, SystemSpace};
    use folder_relocator::registry::RegFileExporter;
    use folder_relocator::relocate::{
        ContentMover, DecisionProvider, FixedAnswer, PathValidator, RegistryBackup, RegistryUpdater,
        RelocationOrchestrator, RestoreAgent,
    };
    use folder_relocator::cli::ConsolePrompt;
    use tracing::{error, info, warn};

    if !platform::is_elevated() {
        let e = RelocateError::NotElevated;
        error!(code = e.code(), kind = e.kind(), "{e}");
        return Err(e.into());
    }

    let store = platform::RegistryShellFolders;
    let exporter = RegFileExporter::new(&store);
    let decisions: Box<dyn DecisionProvider> = if cfg.assume_yes {
        Box::new(FixedAnswer(true))
    } else if atty::is(atty::Stream::Stdin) {
        Box::new(ConsolePrompt::stdio())
    } else {
        warn!("stdin is not a terminal; every confirmation prompt will be answered no");
        Box::new(FixedAnswer(false))
    };

    if let Some(file) = &args.restore {
        RestoreAgent::new(&exporter, cfg.dry_run).restore(file)?;
        out::print_success(&format!("Registry restored from {}", file.display()));
        out::print_warn("Restored locations were not checked; sign out and back in for Explorer to pick them up.");
        return Ok(ExitCode::SUCCESS);
    }

    let target_base = cfg
        .target_base
        .clone()
        .ok_or_else(|| anyhow!("no target base: pass --target or set <target_base> in the config file"))?;

    let space = SystemSpace;
    let base_check = PathValidator::new(&space, cfg.protected_roots.clone(), cfg.min_free_bytes).dry_run(cfg.dry_run);
    let target_base = base_check.validate(&target_base).map_err(|v| {
        let e = RelocateError::from(v);
        error!(code = e.code(), kind = e.kind(), "{e}");
        e
    })?;

    let options = cfg.relocate_options();
    if options.skip_backup {
        out::print_warn("Registry backup disabled (--no-backup); these changes cannot be rolled back from a backup.");
    }
    if options.dry_run {
        out::print_info("Dry-run: nothing on disk or in the registry will change.");
    }
    info!(target_base = %target_base.display(), folders = ?cfg.folders, ?options, "relocation requested");

    let copier = StreamingCopier;
    let linker = platform::JunctionLinker;
    let validator = PathValidator::new(&space, cfg.protected_roots.clone(), cfg.min_free_bytes).dry_run(cfg.dry_run);
    let backup = RegistryBackup::new(&exporter, decisions.as_ref(), &cfg.backup_dir, options);
    let mover = ContentMover::new(&copier, &linker, decisions.as_ref(), options);
    let updater = RegistryUpdater::new(&store, options.dry_run);

    let report = RelocationOrchestrator::new(&store, validator, backup, mover, updater)
        .run(&cfg.folders, &target_base);

    out::print_report(&report, args.json)?;
    if report.success() && !options.dry_run {
        out::print_info("Sign out and back in so Explorer picks up the new folder locations.");
    }
    Ok(if report.success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[cfg(not(windows))]
fn relocate_here(_args: &Args, _cfg: &Config) -> Result<ExitCode> {
    Err(folder_relocator::errors::RelocateError::UnsupportedPlatform.into())
}
