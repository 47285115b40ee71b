use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::ContractService;
use crate::currency::format_amount;

use super::{parse_money, Args};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "contract",
        "Show the contract, or set its total value",
        "contract [set <value>]",
        cmd_contract,
    )]
}

fn cmd_contract(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[], &[])?;
    args.at_most(2, "contract [set <value>]")?;
    match args.get(0) {
        None => show_contract(context),
        Some(action) if action.eq_ignore_ascii_case("set") => {
            let total = parse_money(args.required(1, "contract value")?)?;
            let contract = ContractService::set_total(&context.store, total)?;
            output::success(format!(
                "Contract value set to {}.",
                format_amount(contract.total_contract_value)
            ));
            Ok(())
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown contract action `{other}`; use `contract set <value>`"
        ))),
    }
}

pub(crate) fn show_contract(context: &mut ShellContext) -> CommandResult {
    let total = ContractService::total(&context.store)?;
    let remaining = ContractService::remaining(&context.store)?;
    output::section("Contract");
    output::info(format!("  Total value : {}", format_amount(total)));
    output::info(format!("  Received    : {}", format_amount(total - remaining)));
    output::info(format!("  Remaining   : {}", format_amount(remaining)));
    if remaining < rust_decimal::Decimal::ZERO {
        output::warning("Receipts exceed the contract value.");
    }
    Ok(())
}
