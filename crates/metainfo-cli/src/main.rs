use std::{env, path::PathBuf, process::ExitCode};

use clap::Parser;
use cli::{Args, Commands};
use logging::setup_logging;
use metainfo_config::{
    config::{config_path, generate_default_config, Config},
    error::ConfigError,
};
use metainfo_core::{error::MetainfoError, MetainfoResult};
use metainfo_utils::path::expand_path;
use relations::check_relations;
use syscompat::check_syscompat;
use sysinfo::show_sysinfo;
use target::Target;
use tracing::debug;
use vercmp::compare_versions_cmd;

mod cli;
mod logging;
mod relations;
mod syscompat;
mod sysinfo;
mod target;
mod utils;
mod vercmp;

fn resolve_config_path(custom: Option<&str>) -> MetainfoResult<PathBuf> {
    let Some(custom) = custom else {
        return Ok(config_path()?);
    };

    let path = expand_path(custom).map_err(ConfigError::from)?;
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = env::current_dir().map_err(|source| MetainfoError::IoError {
        action: "retrieving current directory".into(),
        source,
    })?;
    Ok(cwd.join(path))
}

fn handle_cli() -> MetainfoResult<ExitCode> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        utils::disable_color();
    }

    let config_path = resolve_config_path(args.config.as_deref())?;
    debug!("configuration file: {}", config_path.display());

    match args.command {
        Commands::DefConfig => {
            generate_default_config(&config_path)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Vercmp {
            versions,
            ignore_epoch,
        } => compare_versions_cmd(&versions, ignore_epoch),
        command => {
            let config = Config::load_from(&config_path)?;
            let profile = args.profile.as_deref();

            match command {
                Commands::SysInfo {
                    chassis,
                    devices,
                } => {
                    let mut target = Target::select(&config, profile, chassis.as_deref())?;
                    show_sysinfo(&mut target, devices)?;
                    Ok(ExitCode::SUCCESS)
                }
                Commands::CheckRelations {
                    manifest,
                    chassis,
                    with,
                } => {
                    let mut target = Target::select(&config, profile, chassis.as_deref())?;
                    check_relations(&manifest, &mut target, &with)
                }
                Commands::CheckSyscompat {
                    manifest,
                    details,
                    strict,
                    with,
                } => {
                    let target = Target::select(&config, profile, None)?;
                    check_syscompat(&manifest, target, &with, details, strict)?;
                    Ok(ExitCode::SUCCESS)
                }
                Commands::DefConfig | Commands::Vercmp { .. } => unreachable!(),
            }
        }
    }
}

fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    match handle_cli() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(2)
        }
    }
}
