use dialoguer::theme::ColorfulTheme;

use crate::{
    config::{Config, ConfigManager},
    ledger::LedgerStore,
};

use super::registry::CommandRegistry;
use super::state::Navigator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Everything a command handler may touch, passed explicitly to each one.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: LedgerStore,
    pub navigator: Navigator,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub running: bool,
}
