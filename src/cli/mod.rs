pub mod commands;
pub mod core;
mod help;
pub mod output;
pub mod registry;
mod shell;
pub mod shell_context;
pub mod state;

pub use self::core::{CliError, CommandError};
pub use shell::{run_cli, SCRIPT_ENV};
