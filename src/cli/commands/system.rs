use crate::cli::core::{CommandError, CommandResult, CliMode, ShellContext};
use crate::cli::help;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::state::Transition;
use crate::core::services::IntegrityService;
use crate::utils::build_info;

use super::Args;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new(
            "check",
            "Verify tables and cross-references",
            "check",
            cmd_check,
        ),
        CommandEntry::new(
            "reset",
            "Erase every table and start over",
            "reset [--yes]",
            cmd_reset,
        ),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.registry.get(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        }
        return Ok(());
    }
    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_check(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(format!(
        "Config: {}",
        context.config_manager.config_path().display()
    ));
    output::info(format!(
        "Data  : {}",
        context.config_manager.data_dir(&context.config).display()
    ));
    let report = context.store.check_tables()?;
    context.report_tables(&report);
    if report.is_clean() {
        output::success("All tables match their schema.");
    }
    let warnings = IntegrityService::scan(&context.store)?;
    if warnings.is_empty() {
        output::success("No integrity issues found.");
    } else {
        output::section(format!("{} integrity issue(s)", warnings.len()));
        for warning in warnings {
            output::warning(warning);
        }
    }
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &["yes"])?;
    args.at_most(0, "reset [--yes]")?;
    if !args.flag("yes") {
        if context.mode == CliMode::Script {
            return Err(CommandError::InvalidArguments(
                "reset erases every table; run `reset --yes` to confirm".into(),
            ));
        }
        if !context.confirm("Erase every entry, worker, vehicle and the contract?")? {
            output::info("Reset cancelled.");
            return Ok(());
        }
    }
    context.store.clear_all()?;
    context.navigator.apply(Transition::Home)?;
    output::success("All tables erased.");
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Site Ledger {}", meta.version));
    output::info(format!("  Build hash   : {}", meta.git_hash));
    output::info(format!("  Built on     : {}", meta.timestamp));
    output::info(format!("  Profile      : {}", meta.profile));
    output::info(format!("  Rustc        : {}", meta.rustc));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
