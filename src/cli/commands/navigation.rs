use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::state::{Screen, Section, Transition};
use crate::core::services::{VehicleService, WorkerService};

use super::{contract, entries, fleet, team, Args};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "go",
            "Open a section: home, expenses, team, fleet, cash, contract",
            "go <section>",
            cmd_go,
        ),
        CommandEntry::new("back", "Return to the previous screen", "back", cmd_back),
        CommandEntry::new("show", "Redraw the current screen", "show", cmd_show),
        CommandEntry::new(
            "worker",
            "Open a worker's page (from the team screen)",
            "worker <name>",
            cmd_worker,
        ),
        CommandEntry::new(
            "vehicle",
            "Open a vehicle's page (from the fleet screen)",
            "vehicle <label>",
            cmd_vehicle,
        ),
    ]
}

fn cmd_go(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &[])?;
    let target = args.required(0, "section")?;
    let transition = if target.eq_ignore_ascii_case("home") {
        Transition::Home
    } else {
        let section = Section::parse(target).ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "unknown section `{target}`; expected home, expenses, team, fleet, cash or contract"
            ))
        })?;
        Transition::Open(section)
    };
    context.navigator.apply(transition)?;
    render(context)
}

fn cmd_back(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.navigator.apply(Transition::Back)?;
    render(context)
}

fn cmd_show(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    render(context)
}

fn cmd_worker(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &[])?;
    let name = args.rest(0);
    if name.is_empty() {
        return Err(CommandError::InvalidArguments("missing worker name".into()));
    }
    let worker = WorkerService::find_by_name(&context.store, &name)?;
    context.navigator.apply(Transition::SelectWorker(worker.id))?;
    render(context)
}

fn cmd_vehicle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &[])?;
    let label = args.rest(0);
    if label.is_empty() {
        return Err(CommandError::InvalidArguments("missing vehicle label".into()));
    }
    let vehicle = VehicleService::find_by_label(&context.store, &label)?;
    context.navigator.apply(Transition::SelectVehicle(vehicle.id))?;
    render(context)
}

/// Draws whatever the navigator currently points at.
pub(crate) fn render(context: &mut ShellContext) -> CommandResult {
    match context.navigator.current() {
        Screen::Home => entries::show_home(context),
        Screen::Expenses => entries::show_expenses(context),
        Screen::Cash => entries::show_cash(context),
        Screen::Team => team::show_team(context),
        Screen::Worker(id) => match WorkerService::get(&context.store, id) {
            Ok(worker) => team::show_worker(context, &worker),
            Err(_) => forget(context, id),
        },
        Screen::Fleet => fleet::show_fleet(context),
        Screen::Vehicle(id) => match VehicleService::get(&context.store, id) {
            Ok(vehicle) => fleet::show_vehicle(context, &vehicle),
            Err(_) => forget(context, id),
        },
        Screen::Contract => contract::show_contract(context),
    }
}

fn forget(context: &mut ShellContext, id: uuid::Uuid) -> CommandResult {
    output::warning("That page no longer exists.");
    context.navigator.forget(id);
    render(context)
}
