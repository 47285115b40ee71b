//! Shell dispatch, error reporting, and context construction.

use std::io;
use std::path::PathBuf;

use dialoguer::theme::ColorfulTheme;
use uuid::Uuid;

use crate::{
    config::{ConfigError, ConfigManager},
    core::services::{ServiceError, VehicleService, WorkerService},
    errors::LedgerError,
    ledger::{LedgerStore, StoreReport},
};

use super::commands;
use super::output;
use super::registry::CommandRegistry;
pub use super::shell_context::{CliMode, ShellContext};
use super::state::{NavigationError, Navigator, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Readline failure: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Command failed: {0}")]
    Command(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Service(ServiceError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Ledger(err) => CommandError::Ledger(err),
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
            other => CommandError::Service(other),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl ShellContext {
    /// Opens the application home from `$SITE_LEDGER_HOME` (or `~/.site_ledger`).
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_home(mode, None)
    }

    pub fn with_home(mode: CliMode, home: Option<PathBuf>) -> Result<Self, CliError> {
        let config_manager = match home {
            Some(base) => ConfigManager::with_base_dir(base)?,
            None => ConfigManager::new()?,
        };
        let config = config_manager.load()?;
        output::set_preferences(output::OutputPreferences {
            color_enabled: config.ui_color_enabled,
        });
        let store = LedgerStore::from_config(&config, config_manager.base_dir())?;

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let context = ShellContext {
            mode,
            registry,
            store,
            navigator: Navigator::new(),
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            running: true,
        };
        let report = context.store.check_tables()?;
        context.report_tables(&report);
        Ok(context)
    }

    pub(crate) fn report_tables(&self, report: &StoreReport) {
        for migration in &report.migrations {
            output::info(format!("Migration: {}", migration.describe()));
        }
        for table in &report.recovered_tables {
            output::warning(format!(
                "Table `{table}` was unreadable; a copy was kept and an empty table recreated."
            ));
        }
        for warning in &report.warnings {
            output::warning(warning);
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    /// Active worker names and vehicle labels, for argument completion. Read errors
    /// leave the list empty; the next command reports them.
    pub(crate) fn subject_names(&self) -> Vec<String> {
        let workers = WorkerService::list_active(&self.store).unwrap_or_default();
        let vehicles = VehicleService::list(&self.store).unwrap_or_default();
        workers
            .into_iter()
            .map(|worker| worker.name)
            .chain(vehicles.into_iter().map(|vehicle| vehicle.label))
            .collect()
    }

    /// `site-ledger home/team/João> ` style prompt built from the navigation trail.
    pub(crate) fn prompt(&self) -> String {
        let parts: Vec<String> = self
            .navigator
            .trail()
            .iter()
            .chain(std::iter::once(&self.navigator.current()))
            .map(|screen| self.screen_title(*screen))
            .collect();
        format!("site-ledger {}> ", parts.join("/"))
    }

    pub(crate) fn screen_title(&self, screen: Screen) -> String {
        match screen {
            Screen::Worker(id) => WorkerService::get(&self.store, id)
                .map(|worker| worker.name)
                .unwrap_or_else(|_| short_id(id)),
            Screen::Vehicle(id) => VehicleService::get(&self.store, id)
                .map(|vehicle| vehicle.label)
                .unwrap_or_else(|_| short_id(id)),
            other => other.name().to_string(),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match super::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };

        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = self.registry.closest(input, 3) {
            output::info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        dialoguer::Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(CommandError::from)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(self.confirm("Exit shell?")?)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            CommandError::Navigation(err) => {
                output::error(&err);
                if matches!(err, NavigationError::WorkerOutsideTeam(_)) {
                    output::info("Open the team first with `go team`.");
                } else if matches!(err, NavigationError::VehicleOutsideFleet(_)) {
                    output::info("Open the fleet first with `go fleet`.");
                }
            }
            other => output::error(other),
        }
    }
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

#[cfg(test)]
pub(crate) fn process_script(
    home: &std::path::Path,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_home(CliMode::Script, Some(home.to_path_buf()))?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn script_builds_books_and_navigates() {
        let home = tempfile::tempdir().unwrap();
        let app = process_script(
            home.path(),
            &[
                "hire Ana 100 --role Mason --start 2024-03-01",
                "attend Ana full --date 2024-03-02",
                "attend Ana half --date 2024-03-03",
                "pay Ana advance 50 --date 2024-03-03",
                "go team",
                "worker ana",
            ],
        )
        .unwrap();
        let worker = WorkerService::find_by_name(&app.store, "Ana").unwrap();
        assert_eq!(app.store.worker_balance(&worker).unwrap(), Decimal::new(100, 0));
        assert_eq!(app.navigator.current(), Screen::Worker(worker.id));
        assert_eq!(app.prompt(), "site-ledger home/team/Ana> ");
    }

    #[test]
    fn selecting_worker_outside_team_is_a_navigation_error() {
        let home = tempfile::tempdir().unwrap();
        let mut app = process_script(home.path(), &["hire Ana 100"]).unwrap();
        let err = app.process_line("worker Ana").unwrap_err();
        assert!(matches!(err, CommandError::Navigation(_)));
        assert_eq!(app.navigator.current(), Screen::Home);
    }

    #[test]
    fn reset_requires_explicit_flag_in_script_mode() {
        let home = tempfile::tempdir().unwrap();
        let mut app = process_script(home.path(), &["receipt 10 --date 2024-01-01"]).unwrap();
        assert!(app.process_line("reset").is_err());
        assert_eq!(app.store.entries().unwrap().len(), 1);
        app.process_line("reset --yes").unwrap();
        assert!(app.store.entries().unwrap().is_empty());
    }

    #[test]
    fn unknown_command_is_not_an_error() {
        let home = tempfile::tempdir().unwrap();
        let mut app = process_script(home.path(), &[]).unwrap();
        assert_eq!(app.process_line("balanse").unwrap(), LoopControl::Continue);
        assert_eq!(app.registry.closest("balanse", 3), Some("balance"));
        assert_eq!(app.process_line("exit").unwrap(), LoopControl::Exit);
        assert!(!app.running);
    }
}
