use crate::cli::core::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{EntryService, LedgerSummary, NewEntry, SummaryService};
use crate::currency::format_amount;
use crate::domain::{categories, common::format_date, EntityRef, LedgerEntry};
use crate::ledger::EntryFilter;

use super::{date_or_today, parse_day, parse_method, parse_money, screen_entity, Args};

const RECENT_ROWS: usize = 10;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "expense",
            "Record money going out",
            "expense <amount> <category> [description] [--entity NAME] [--date YYYY-MM-DD] [--method cash|card|pix|transfer]",
            cmd_expense,
        ),
        CommandEntry::new(
            "receipt",
            "Record money coming in",
            "receipt <amount> [description] [--category NAME] [--date YYYY-MM-DD] [--method NAME]",
            cmd_receipt,
        ),
        CommandEntry::new(
            "entries",
            "List ledger entries",
            "entries [--category C] [--entity E] [--from D] [--to D] [--method M] [--search TEXT] [--limit N] [--in|--out]",
            cmd_entries,
        ),
        CommandEntry::new(
            "delete-entry",
            "Delete an entry by id prefix",
            "delete-entry <id>",
            cmd_delete_entry,
        ),
        CommandEntry::new(
            "balance",
            "Show cash, contract and wage totals",
            "balance",
            cmd_balance,
        ),
    ]
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["entity", "date", "method"], &[])?;
    let amount = parse_money(args.required(0, "amount")?)?;
    let category = args.required(1, "category")?;
    let entity = match args.option("entity") {
        Some(name) => EntityRef::parse(name),
        None => screen_entity(context).unwrap_or_default(),
    };
    let input = NewEntry::new(date_or_today(args.option("date"))?, category, amount)
        .description(args.rest(2))
        .entity(entity)
        .paid_with(parse_method(args.option("method")));
    let entry = EntryService::record_expense(&context.store, input)?;
    output::success(format!(
        "Recorded {} {} ({}).",
        entry.category,
        format_amount(entry.amount),
        short_id(entry.id)
    ));
    Ok(())
}

fn cmd_receipt(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["category", "date", "method"], &[])?;
    let amount = parse_money(args.required(0, "amount")?)?;
    let input = NewEntry::new(
        date_or_today(args.option("date"))?,
        args.option("category").unwrap_or(categories::REVENUE),
        amount,
    )
    .description(args.rest(1))
    .paid_with(parse_method(args.option("method")));
    let entry = EntryService::record_receipt(&context.store, input)?;
    output::success(format!(
        "Received {} as {} ({}).",
        format_amount(entry.amount),
        entry.category,
        short_id(entry.id)
    ));
    Ok(())
}

fn cmd_entries(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(
        args,
        &["category", "entity", "from", "to", "method", "search", "limit"],
        &["in", "out"],
    )?;
    args.at_most(0, "entries [options]")?;
    let mut filter = EntryFilter::new();
    if let Some(category) = args.option("category") {
        filter = filter.category(category);
    }
    match args.option("entity") {
        Some(name) => filter = filter.entity(EntityRef::parse(name)),
        None => {
            if let Some(entity) = screen_entity(context) {
                filter = filter.entity(entity);
            }
        }
    }
    let from = args.option("from").map(parse_day).transpose()?;
    let to = args.option("to").map(parse_day).transpose()?;
    if from.is_some() || to.is_some() {
        filter = filter.between(from, to);
    }
    if let Some(method) = parse_method(args.option("method")) {
        filter = filter.paid_with(method);
    }
    if let Some(text) = args.option("search") {
        filter = filter.description_contains(text);
    }
    match (args.flag("in"), args.flag("out")) {
        (true, true) => {
            return Err(CommandError::InvalidArguments(
                "choose either --in or --out".into(),
            ))
        }
        (true, false) => filter = filter.inflows(),
        (false, true) => filter = filter.outflows(),
        (false, false) => {}
    }
    let limit = args
        .option("limit")
        .map(|raw| {
            raw.parse::<usize>().map_err(|_| {
                CommandError::InvalidArguments(format!("`{raw}` is not a row count"))
            })
        })
        .transpose()?;

    let mut rows = EntryService::list(&context.store, &filter)?;
    let total: rust_decimal::Decimal = rows.iter().map(|entry| entry.amount).sum();
    let count = rows.len();
    if let Some(limit) = limit {
        rows = rows.split_off(rows.len().saturating_sub(limit));
    }
    print_entries(&rows);
    output::info(format!("{count} entr(ies), total {}", format_amount(total)));
    Ok(())
}

fn cmd_delete_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &[])?;
    let prefix = args.required(0, "entry id")?.to_ascii_lowercase();
    let matches: Vec<LedgerEntry> = context
        .store
        .entries()?
        .into_iter()
        .filter(|entry| entry.id.simple().to_string().starts_with(&prefix))
        .collect();
    let entry = match matches.as_slice() {
        [single] => single,
        [] => {
            return Err(CommandError::Message(format!(
                "no entry id starts with `{prefix}`"
            )))
        }
        _ => {
            return Err(CommandError::InvalidArguments(format!(
                "`{prefix}` matches {} entries; type more of the id",
                matches.len()
            )))
        }
    };
    let removed = EntryService::delete(&context.store, entry.id)?;
    output::success(format!(
        "Deleted {} {} from {}.",
        removed.category,
        format_amount(removed.amount),
        format_date(removed.date)
    ));
    Ok(())
}

fn cmd_balance(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = SummaryService::snapshot(&context.store)?;
    print_totals(&summary);
    output::section("By category");
    let rows: Vec<Vec<String>> = summary
        .by_category
        .iter()
        .map(|(category, total)| vec![category.clone(), format_amount(*total)])
        .collect();
    output::render_table(&["Category", "Total"], &rows);
    Ok(())
}

pub(crate) fn show_home(context: &mut ShellContext) -> CommandResult {
    let summary = SummaryService::snapshot(&context.store)?;
    output::section("Home");
    output::info(format!("  Cash balance      : {}", format_amount(summary.cash_balance)));
    output::info(format!(
        "  Contract remaining: {}",
        format_amount(summary.contract_remaining)
    ));
    output::info(format!("  Wages owed        : {}", format_amount(summary.wages_owed())));
    for statement in summary.overpaid() {
        output::warning(format!(
            "{} has been paid {} more than earned.",
            statement.name,
            format_amount(-statement.balance)
        ));
    }
    output::info("Sections: expenses, team, fleet, cash, contract (`go <section>`).");
    Ok(())
}

pub(crate) fn show_expenses(context: &mut ShellContext) -> CommandResult {
    output::section("Expenses");
    let mut recent = EntryService::list(&context.store, &EntryFilter::new().outflows())?;
    recent = recent.split_off(recent.len().saturating_sub(RECENT_ROWS));
    print_entries(&recent);
    output::info(format!(
        "Categories: {}",
        context.config.expense_categories.join(", ")
    ));
    Ok(())
}

pub(crate) fn show_cash(context: &mut ShellContext) -> CommandResult {
    let summary = SummaryService::snapshot(&context.store)?;
    print_totals(&summary);
    Ok(())
}

fn print_totals(summary: &LedgerSummary) {
    output::section("Cash");
    output::info(format!("  Money in          : {}", format_amount(summary.total_inflow)));
    output::info(format!("  Money out         : {}", format_amount(summary.total_outflow)));
    output::info(format!("  Cash balance      : {}", format_amount(summary.cash_balance)));
    output::info(format!("  Card pending      : {}", format_amount(summary.card_pending)));
    output::info(format!("  Contract total    : {}", format_amount(summary.contract_total)));
    output::info(format!(
        "  Contract remaining: {}",
        format_amount(summary.contract_remaining)
    ));
    output::info(format!("  Wages owed        : {}", format_amount(summary.wages_owed())));
}

pub(crate) fn print_entries(entries: &[LedgerEntry]) {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                short_id(entry.id),
                format_date(entry.date),
                entry.category.clone(),
                entry.description.clone(),
                entry.entity.to_string(),
                entry
                    .payment_method
                    .as_ref()
                    .map(|method| method.to_string())
                    .unwrap_or_default(),
                format_amount(entry.amount),
            ]
        })
        .collect();
    output::render_table(
        &["Id", "Date", "Category", "Description", "Entity", "Method", "Amount"],
        &rows,
    );
}
