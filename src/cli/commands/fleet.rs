use rust_decimal::Decimal;

use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{EntryService, SummaryService, VehicleService};
use crate::currency::format_amount;
use crate::domain::Vehicle;
use crate::ledger::EntryFilter;

use super::entries::print_entries;
use super::{parse_money, Args};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "vehicle-add",
            "Register a vehicle",
            "vehicle-add <label> [--plate PLATE] [--odometer KM]",
            cmd_add,
        ),
        CommandEntry::new(
            "rename-vehicle",
            "Relabel a vehicle and its ledger entries",
            "rename-vehicle <label> <new-label>",
            cmd_rename,
        ),
        CommandEntry::new(
            "vehicles",
            "List vehicles with their running cost",
            "vehicles",
            cmd_list,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["plate", "odometer"], &[])?;
    let label = args.rest(0);
    let odometer = match args.option("odometer") {
        Some(raw) => parse_money(raw)?,
        None => Decimal::ZERO,
    };
    let vehicle = VehicleService::register(
        &context.store,
        &label,
        args.option("plate").unwrap_or_default(),
        odometer,
    )?;
    output::success(format!("Registered {}.", vehicle.label));
    Ok(())
}

fn cmd_rename(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &[])?;
    args.at_most(2, "rename-vehicle <label> <new-label>")?;
    let vehicle = VehicleService::find_by_label(&context.store, args.required(0, "vehicle label")?)?;
    let new_label = args.required(1, "new label")?;
    let outcome = VehicleService::rename(&context.store, vehicle.id, new_label)?;
    output::success(format!(
        "Relabeled {} as {} ({} entries updated).",
        vehicle.label,
        new_label.trim(),
        outcome.entries_updated
    ));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    show_fleet(context)
}

pub(crate) fn show_fleet(context: &mut ShellContext) -> CommandResult {
    output::section("Fleet");
    let summary = SummaryService::snapshot(&context.store)?;
    let rows: Vec<Vec<String>> = summary
        .vehicles
        .iter()
        .map(|cost| {
            vec![
                cost.label.clone(),
                cost.plate.clone(),
                format_amount(cost.cost_to_date),
            ]
        })
        .collect();
    output::render_table(&["Label", "Plate", "Cost to date"], &rows);
    Ok(())
}

pub(crate) fn show_vehicle(context: &mut ShellContext, vehicle: &Vehicle) -> CommandResult {
    output::section(format!("Vehicle: {}", vehicle.label));
    output::info(format!("  Plate          : {}", vehicle.plate));
    output::info(format!(
        "  Initial reading: {}",
        vehicle.initial_odometer.normalize()
    ));
    output::info(format!(
        "  Cost to date   : {}",
        format_amount(context.store.vehicle_cost_to_date(vehicle)?)
    ));
    let entries = EntryService::list(
        &context.store,
        &EntryFilter::new().named(vehicle.label.clone()),
    )?;
    print_entries(&entries);
    Ok(())
}
