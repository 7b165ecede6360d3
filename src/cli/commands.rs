//! Command dispatch

use std::fs::File;
use std::io::{self, BufReader};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, MenuArgs};
use crate::cli::menu::Menu;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        None => run_menu(cli, &MenuArgs::default()),
        Some(Commands::Menu(args)) => run_menu(cli, args),
        Some(Commands::Config { command }) => run_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Effective settings for a menu session: config layers, then command line flags.
pub fn menu_settings(cli: &Cli, args: &MenuArgs) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(root_tag) = &args.root_tag {
        settings.root_tag = root_tag.clone();
    }
    if let Some(save_file) = &args.save_file {
        settings.save_file = save_file.clone();
    }
    settings
        .validate()
        .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    Ok(settings)
}

#[instrument(skip(cli))]
fn run_menu(cli: &Cli, args: &MenuArgs) -> CliResult<()> {
    let settings = menu_settings(cli, args)?;
    debug!(?settings, "starting menu");
    let save_file = settings.save_file.clone();
    let container = ServiceContainer::new(settings);
    let service = container.dom_service();
    let stdout = io::stdout();

    match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::NoInput {
                path: path.clone(),
                source,
            })?;
            Menu::new(service, BufReader::new(file), stdout.lock(), save_file)
                .with_outline(args.tree)
                .run()
                .map_err(|e| InfraError::io("menu session", e))?;
        }
        None => {
            let stdin = io::stdin();
            Menu::new(service, stdin.lock(), stdout.lock(), save_file)
                .with_outline(args.tree)
                .run()
                .map_err(|e| InfraError::io("menu session", e))?;
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn run_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    let mut out = io::stdout();
    let written = match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&mut out, &settings.to_toml()?)
        }
        ConfigCommands::Template => output::info(&mut out, &Settings::template()),
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unavailable)".to_string());
            let local = cli
                .config
                .clone()
                .unwrap_or_else(|| local_config_path(std::path::Path::new(".")));
            output::info(&mut out, &format!("global: {}", global))
                .and_then(|_| output::info(&mut out, &format!("local:  {}", local.display())))
        }
    };
    written.map_err(|e| InfraError::io("write to stdout", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use clap::Parser;

    use super::*;

    #[test]
    fn given_missing_input_file_when_running_menu_then_no_input_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("domviz.toml");
        std::fs::write(&config, "").unwrap();
        let script = dir.path().join("absent.txt");
        let cli = Cli::try_parse_from([
            OsString::from("domviz"),
            "--config".into(),
            config.into_os_string(),
            "menu".into(),
            "--input".into(),
            script.into_os_string(),
        ])
        .unwrap();

        let err = execute_command(&cli).unwrap_err();

        assert!(matches!(err, CliError::NoInput { .. }));
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn given_root_tag_flag_when_building_settings_then_flag_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("domviz.toml");
        std::fs::write(&config, "root_tag = \"svg\"\n").unwrap();
        let cli = Cli::try_parse_from([
            OsString::from("domviz"),
            "--config".into(),
            config.into_os_string(),
            "menu".into(),
            "--root-tag".into(),
            "body".into(),
        ])
        .unwrap();
        let Some(Commands::Menu(args)) = &cli.command else {
            panic!("expected menu subcommand");
        };

        let settings = menu_settings(&cli, args).unwrap();

        assert_eq!(settings.root_tag, "body");
    }
}
