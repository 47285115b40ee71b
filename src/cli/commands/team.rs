use rust_decimal::Decimal;

use crate::cli::core::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{
    AttendanceService, EntryService, NewWorker, PaymentKind, WorkerService,
};
use crate::currency::format_amount;
use crate::domain::{common::format_date, PaymentDetails, Worker};
use crate::ledger::{BalanceStatus, EntryFilter, WorkerStatement};

use super::entries::print_entries;
use super::{date_or_today, parse_method, parse_money, Args};

const DEFAULT_PAYMENT_ROWS: usize = 10;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "hire",
            "Add a worker to the roster",
            "hire <name> <daily-rate> [--role R] [--start YYYY-MM-DD] [--pix KEY] [--bank NAME]",
            cmd_hire,
        ),
        CommandEntry::new(
            "rename-worker",
            "Rename a worker everywhere they are referenced",
            "rename-worker <name> <new-name>",
            cmd_rename,
        ),
        CommandEntry::new(
            "rate",
            "Change a worker's daily rate",
            "rate <name> <daily-rate>",
            cmd_rate,
        ),
        CommandEntry::new(
            "dismiss",
            "Take a worker off the active roster",
            "dismiss <name>",
            cmd_dismiss,
        ),
        CommandEntry::new(
            "attend",
            "Record a day (1), half day (0.5) or absence (0)",
            "attend <name> <1|0.5|0|full|half|none> [--date YYYY-MM-DD] [--note TEXT]",
            cmd_attend,
        ),
        CommandEntry::new(
            "pay",
            "Pay a worker an advance or the final settlement",
            "pay <name> <advance|final> <amount> [--date YYYY-MM-DD] [--method NAME]",
            cmd_pay,
        ),
        CommandEntry::new(
            "payments",
            "Show the latest labor payments",
            "payments [count]",
            cmd_payments,
        ),
        CommandEntry::new(
            "workers",
            "List active workers and what they are owed",
            "workers",
            cmd_workers,
        ),
    ]
}

fn cmd_hire(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["role", "start", "pix", "bank"], &[])?;
    args.at_most(2, "hire <name> <daily-rate> [options]")?;
    let name = args.required(0, "worker name")?;
    let rate = parse_money(args.required(1, "daily rate")?)?;
    let details = PaymentDetails {
        pix_key: args.option("pix").map(str::to_string),
        bank: args.option("bank").map(str::to_string),
    };
    let input = NewWorker::new(name, rate, date_or_today(args.option("start"))?)
        .role(args.option("role").unwrap_or_default())
        .payment_details(details);
    let worker = WorkerService::hire(&context.store, input)?;
    output::success(format!(
        "Hired {} at {} per day.",
        worker.name,
        format_amount(worker.daily_rate)
    ));
    Ok(())
}

fn cmd_rename(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &[])?;
    args.at_most(2, "rename-worker <name> <new-name>")?;
    let worker = WorkerService::find_by_name(&context.store, args.required(0, "worker name")?)?;
    let new_name = args.required(1, "new name")?;
    let outcome = WorkerService::rename(&context.store, worker.id, new_name)?;
    output::success(format!(
        "Renamed {} to {} ({} entries, {} attendance records updated).",
        worker.name,
        new_name.trim(),
        outcome.entries_updated,
        outcome.attendance_updated
    ));
    Ok(())
}

fn cmd_rate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &[])?;
    args.at_most(2, "rate <name> <daily-rate>")?;
    let worker = WorkerService::find_by_name(&context.store, args.required(0, "worker name")?)?;
    let rate = parse_money(args.required(1, "daily rate")?)?;
    let updated = WorkerService::set_rate(&context.store, worker.id, rate)?;
    output::success(format!(
        "{} now earns {} per day.",
        updated.name,
        format_amount(updated.daily_rate)
    ));
    Ok(())
}

fn cmd_dismiss(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &[])?;
    let name = args.rest(0);
    let worker = WorkerService::find_by_name(&context.store, &name)?;
    if !worker.active {
        return Err(CommandError::Message(format!(
            "{} is already off the roster",
            worker.name
        )));
    }
    let statement = context.store.worker_statement(&worker)?;
    WorkerService::deactivate(&context.store, worker.id)?;
    context.navigator.forget(worker.id);
    output::success(format!("{} is no longer on the active roster.", worker.name));
    if statement.status == BalanceStatus::Owed {
        output::warning(format!(
            "{} is still owed {}.",
            worker.name,
            format_amount(statement.balance)
        ));
    }
    Ok(())
}

fn cmd_attend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["date", "note"], &[])?;
    args.at_most(2, "attend <name> <fraction> [options]")?;
    let name = args.required(0, "worker name")?;
    let fraction = parse_fraction(args.required(1, "day fraction")?)?;
    let record = AttendanceService::record(
        &context.store,
        name,
        date_or_today(args.option("date"))?,
        fraction,
        args.option("note").unwrap_or_default(),
    )?;
    output::success(format!(
        "{} credited {} day(s) on {}.",
        record.worker_name,
        record.fraction,
        format_date(record.date)
    ));
    Ok(())
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["date", "method"], &[])?;
    args.at_most(3, "pay <name> <advance|final> <amount> [options]")?;
    let name = args.required(0, "worker name")?;
    let kind_raw = args.required(1, "payment kind")?;
    let kind = PaymentKind::parse(kind_raw).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "unknown payment kind `{kind_raw}`; use advance or final"
        ))
    })?;
    let amount = parse_money(args.required(2, "amount")?)?;
    let entry = EntryService::record_labor_payment(
        &context.store,
        name,
        kind,
        amount,
        date_or_today(args.option("date"))?,
        parse_method(args.option("method")),
    )?;
    output::success(format!(
        "{} ({}) recorded.",
        entry.description,
        format_amount(entry.amount)
    ));

    let worker = WorkerService::find_by_name(&context.store, name)?;
    let statement = context.store.worker_statement(&worker)?;
    report_balance(&statement);
    Ok(())
}

fn cmd_payments(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &[])?;
    let limit = match args.get(0) {
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            CommandError::InvalidArguments(format!("`{raw}` is not a row count"))
        })?,
        None => DEFAULT_PAYMENT_ROWS,
    };
    output::section("Latest labor payments");
    let payments = EntryService::recent_labor_payments(&context.store, limit)?;
    print_entries(&payments);
    Ok(())
}

fn cmd_workers(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    show_team(context)
}

pub(crate) fn show_team(context: &mut ShellContext) -> CommandResult {
    output::section("Team");
    let mut statements = Vec::new();
    for worker in WorkerService::list_active(&context.store)? {
        let statement = context.store.worker_statement(&worker)?;
        statements.push((worker, statement));
    }
    let rows: Vec<Vec<String>> = statements
        .iter()
        .map(|(worker, statement)| {
            vec![
                worker.name.clone(),
                worker.role.clone(),
                format_amount(worker.daily_rate),
                statement.days_worked.normalize().to_string(),
                format_amount(statement.balance),
                status_label(statement.status).to_string(),
            ]
        })
        .collect();
    output::render_table(&["Name", "Role", "Rate", "Days", "Balance", "Status"], &rows);
    Ok(())
}

pub(crate) fn show_worker(context: &mut ShellContext, worker: &Worker) -> CommandResult {
    output::section(format!("Worker: {}", worker.name));
    output::info(format!("  Role      : {}", worker.role));
    output::info(format!("  Daily rate: {}", format_amount(worker.daily_rate)));
    output::info(format!("  Started   : {}", format_date(worker.start_date)));
    if let Some(pix) = &worker.payment_details.pix_key {
        output::info(format!("  Pix key   : {pix}"));
    }
    if let Some(bank) = &worker.payment_details.bank {
        output::info(format!("  Bank      : {bank}"));
    }
    if !worker.active {
        output::warning("Not on the active roster.");
    }

    let statement = context.store.worker_statement(worker)?;
    output::info(format!(
        "  Days {} x {} = {}, paid {}",
        statement.days_worked.normalize(),
        format_amount(statement.daily_rate),
        format_amount(statement.gross_earned),
        format_amount(statement.disbursed)
    ));
    report_balance(&statement);

    output::section("Attendance");
    let rows: Vec<Vec<String>> = AttendanceService::for_worker(&context.store, &worker.name)?
        .into_iter()
        .map(|record| {
            vec![
                short_id(record.id),
                format_date(record.date),
                record.fraction.normalize().to_string(),
                record.note,
            ]
        })
        .collect();
    output::render_table(&["Id", "Date", "Days", "Note"], &rows);

    output::section("Payments");
    let payments = EntryService::list(
        &context.store,
        &EntryFilter::new().named(worker.name.clone()),
    )?;
    print_entries(&payments);
    Ok(())
}

fn report_balance(statement: &WorkerStatement) {
    match statement.status {
        BalanceStatus::Owed => output::info(format!(
            "  {} is owed {}.",
            statement.name,
            format_amount(statement.balance)
        )),
        BalanceStatus::Settled => output::info(format!("  {} is settled.", statement.name)),
        BalanceStatus::Overpaid => output::warning(format!(
            "{} has been paid {} more than earned.",
            statement.name,
            format_amount(-statement.balance)
        )),
    }
}

fn status_label(status: BalanceStatus) -> &'static str {
    match status {
        BalanceStatus::Owed => "owed",
        BalanceStatus::Settled => "settled",
        BalanceStatus::Overpaid => "overpaid",
    }
}

fn parse_fraction(raw: &str) -> Result<Decimal, CommandError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "full" => Ok(Decimal::ONE),
        "half" => Ok(Decimal::new(5, 1)),
        "none" | "absent" => Ok(Decimal::ZERO),
        _ => parse_money(raw),
    }
}
