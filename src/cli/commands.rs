//! Command dispatch: resolves the archive, loads settings, runs the service

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::symbol_label;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::TrailingPolicy;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Decode {
            file,
            lenient,
            no_codes,
        }) => cmd_decode(file.as_deref(), *lenient, *no_codes),
        Some(Commands::Codes { file }) => cmd_codes(file.as_deref()),
        Some(Commands::Tree { file }) => cmd_tree(file.as_deref()),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        // Bare invocation behaves like the interactive decoder
        None => cmd_decode(None, false, false),
    }
}

/// Use the given archive path or ask for one on stdin.
fn resolve_archive(file: Option<&Path>) -> CliResult<PathBuf> {
    if let Some(file) = file {
        return Ok(file.to_path_buf());
    }

    output::prompt("Please enter filename to decode:");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| InfraError::io("read filename from stdin", e))?;

    let name = line.trim();
    if name.is_empty() {
        return Err(CliError::Usage("no archive file given".to_string()));
    }
    Ok(PathBuf::from(name))
}

/// Directory whose `.msgtree.toml` applies to `archive`.
fn archive_dir(archive: &Path) -> &Path {
    archive
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn container_for(archive: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(Some(archive_dir(archive)))?;
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

#[instrument]
fn cmd_decode(file: Option<&Path>, lenient: bool, no_codes: bool) -> CliResult<()> {
    let archive = resolve_archive(file)?;
    let container = container_for(&archive)?;

    let trailing = lenient.then_some(TrailingPolicy::Lenient);
    let report = container.decode.decode_file(&archive, trailing)?;

    if no_codes {
        output::raw(&report.render_message());
    } else {
        output::raw(&format!(
            "\n{}",
            report.render(container.settings.escape_symbols)
        ));
    }
    Ok(())
}

#[instrument]
fn cmd_codes(file: Option<&Path>) -> CliResult<()> {
    let archive = resolve_archive(file)?;
    let container = container_for(&archive)?;

    let codes = container.decode.code_table_file(&archive)?;
    if !codes.is_prefix_free() {
        output::warning("code table is not prefix-free");
    }
    for entry in &codes {
        output::info(&format!(
            "{}\t{}",
            symbol_label(entry.symbol, container.settings.escape_symbols),
            entry.code
        ));
    }
    Ok(())
}

#[instrument]
fn cmd_tree(file: Option<&Path>) -> CliResult<()> {
    let archive = resolve_archive(file)?;
    let container = container_for(&archive)?;

    let tree = container.decode.tree_file(&archive)?;
    output::raw(&tree.to_termtree());
    output::detail(&format!(
        "{} nodes, {} leaves, depth {}{}",
        tree.len(),
        tree.leaf_count(),
        tree.depth(),
        if tree.is_complete() { "" } else { " (incomplete)" }
    ));
    Ok(())
}

#[instrument]
fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { dir } => {
            let settings = Settings::load(dir.as_deref())?;
            output::raw(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info("global: (no config directory)"),
            }
            output::info(&format!(
                "local:  {}",
                local_config_path(Path::new("<archive_dir>")).display()
            ));
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("cannot determine config directory".to_string())
            })?;
            let fs = RealFileSystem;
            if fs.exists(&path) && !*force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create {}", path.display()), e))?;
            fs.write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
        }
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_dir_defaults_to_cwd() {
        assert_eq!(archive_dir(Path::new("msg.arch")), Path::new("."));
        assert_eq!(
            archive_dir(Path::new("data/msg.arch")),
            Path::new("data")
        );
    }

    #[test]
    fn test_resolve_archive_uses_given_path() {
        let path = resolve_archive(Some(Path::new("x.arch"))).unwrap();
        assert_eq!(path, PathBuf::from("x.arch"));
    }
}
