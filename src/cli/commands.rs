//! Command dispatch: maps parsed arguments onto services and prints results

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::PathContextExt;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Config { command }) => return config_command(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        None => {
            return Err(CliError::Usage(
                "no command given, see --help".to_string(),
            ))
        }
        _ => {}
    }

    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Get { pdf, bookmark }) => get(&container, pdf, bookmark.as_deref()),
        Some(Commands::Set {
            pdf,
            bookmark,
            offset,
        }) => set(&container, pdf, bookmark, *offset, false),
        Some(Commands::Rst {
            pdf,
            bookmark,
            offset,
        }) => set(&container, pdf, bookmark, *offset, true),
        Some(Commands::Rm { pdf }) => rm(&container, pdf),
        Some(Commands::Show { pdf, tree }) => show(&container, pdf, *tree),
        _ => Ok(()),
    }
}

#[instrument(skip(container))]
fn get(container: &ServiceContainer, pdf: &Path, bookmark: Option<&Path>) -> CliResult<()> {
    let report = container.bookmarks.export(pdf, bookmark)?;
    if report.overwritten {
        output::warning(&format!("overwrote {}", report.output.display()));
    }
    output::success(&format!(
        "exported {} bookmarks to {}",
        report.entries,
        report.output.display()
    ));
    Ok(())
}

#[instrument(skip(container))]
fn set(
    container: &ServiceContainer,
    pdf: &Path,
    bookmark: &Path,
    offset: Option<i64>,
    replace: bool,
) -> CliResult<()> {
    let report = if replace {
        container.bookmarks.reset(pdf, bookmark, offset)?
    } else {
        container.bookmarks.import(pdf, bookmark, offset)?
    };
    if report.entries == 0 {
        output::warning(&format!("no bookmark lines found in {}", bookmark.display()));
    }
    output::success(&format!(
        "imported {} bookmarks, saved as {}",
        report.entries,
        report.output.display()
    ));
    Ok(())
}

#[instrument(skip(container))]
fn rm(container: &ServiceContainer, pdf: &Path) -> CliResult<()> {
    let report = container.bookmarks.remove(pdf)?;
    if !report.removed {
        output::warning(&format!("{} has no bookmarks", pdf.display()));
    }
    output::success(&format!("saved as {}", report.output.display()));
    Ok(())
}

#[instrument(skip(container))]
fn show(container: &ServiceContainer, pdf: &Path, tree: bool) -> CliResult<()> {
    if tree {
        output::info(&container.bookmarks.outline_tree(pdf)?);
    } else {
        print!("{}", container.bookmarks.render(pdf)?);
    }
    Ok(())
}

fn config_command(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            print!("{}", settings.to_toml()?);
        }
        ConfigCommands::Path => match config_file(cli) {
            Some(path) => {
                let state = if path.exists() { "" } else { " (not found)" };
                output::info(&format!("{}{}", path.display(), state));
            }
            None => output::warning("no config directory available on this platform"),
        },
        ConfigCommands::Init { force } => {
            let path = config_file(cli).ok_or_else(|| {
                CliError::Usage("no config directory available, use --config".to_string())
            })?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} exists, use --force to overwrite",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_path_context("create config directory", parent)?;
            }
            std::fs::write(&path, Settings::template()).with_path_context("write config", &path)?;
            output::success(&format!("created {}", path.display()));
        }
    }
    Ok(())
}

fn config_file(cli: &Cli) -> Option<PathBuf> {
    cli.config.clone().or_else(global_config_path)
}
