pub mod contract;
pub mod entries;
pub mod fleet;
pub mod navigation;
pub mod system;
pub mod team;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use crate::cli::core::{CommandError, ShellContext};
use crate::cli::registry::CommandRegistry;
use crate::cli::state::Screen;
use crate::core::services::{VehicleService, WorkerService};
use crate::currency;
use crate::domain::{common::parse_date, EntityRef, PaymentMethod};

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(navigation::definitions())
        .chain(entries::definitions())
        .chain(team::definitions())
        .chain(fleet::definitions())
        .chain(contract::definitions())
    {
        registry.register(entry);
    }
}

/// Tokens after the command name, split into positionals, `--name value` options,
/// and bare `--flag`s.
pub(crate) struct Args<'a> {
    positional: Vec<&'a str>,
    options: Vec<(&'a str, &'a str)>,
    flags: Vec<&'a str>,
}

impl<'a> Args<'a> {
    pub fn parse(
        raw: &[&'a str],
        options: &[&str],
        flags: &[&str],
    ) -> Result<Self, CommandError> {
        let mut parsed = Args {
            positional: Vec::new(),
            options: Vec::new(),
            flags: Vec::new(),
        };
        let mut tokens = raw.iter().copied();
        while let Some(token) = tokens.next() {
            let Some(name) = token.strip_prefix("--") else {
                parsed.positional.push(token);
                continue;
            };
            if let Some((key, value)) = name.split_once('=') {
                if !options.contains(&key) {
                    return Err(unknown_option(key));
                }
                parsed.options.push((key, value));
            } else if flags.contains(&name) {
                parsed.flags.push(name);
            } else if options.contains(&name) {
                let value = tokens.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("option `--{name}` needs a value"))
                })?;
                parsed.options.push((name, value));
            } else {
                return Err(unknown_option(name));
            }
        }
        Ok(parsed)
    }

    pub fn required(&self, index: usize, what: &str) -> Result<&'a str, CommandError> {
        self.positional
            .get(index)
            .copied()
            .ok_or_else(|| CommandError::InvalidArguments(format!("missing {what}")))
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.positional.get(index).copied()
    }

    /// Positionals from `index` on, joined by spaces.
    pub fn rest(&self, index: usize) -> String {
        self.positional
            .get(index..)
            .map(|rest| rest.join(" "))
            .unwrap_or_default()
    }

    pub fn option(&self, name: &str) -> Option<&'a str> {
        self.options
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(&name)
    }

    pub fn at_most(&self, count: usize, usage: &str) -> Result<(), CommandError> {
        if self.positional.len() > count {
            Err(CommandError::InvalidArguments(format!("usage: {usage}")))
        } else {
            Ok(())
        }
    }
}

fn unknown_option(name: &str) -> CommandError {
    CommandError::InvalidArguments(format!("unknown option `--{name}`"))
}

pub(crate) fn parse_money(raw: &str) -> Result<Decimal, CommandError> {
    currency::parse_amount(raw).map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

pub(crate) fn parse_day(raw: &str) -> Result<NaiveDate, CommandError> {
    parse_date(raw).ok_or_else(|| {
        CommandError::InvalidArguments(format!("invalid date `{raw}` (use YYYY-MM-DD)"))
    })
}

/// `--date` when given, otherwise today.
pub(crate) fn date_or_today(raw: Option<&str>) -> Result<NaiveDate, CommandError> {
    raw.map(parse_day)
        .transpose()
        .map(|date| date.unwrap_or_else(|| Local::now().date_naive()))
}

pub(crate) fn parse_method(raw: Option<&str>) -> Option<PaymentMethod> {
    raw.and_then(PaymentMethod::parse)
}

/// The worker or vehicle the shell is looking at, as a ledger entity.
pub(crate) fn screen_entity(context: &ShellContext) -> Option<EntityRef> {
    match context.navigator.current() {
        Screen::Worker(id) => WorkerService::get(&context.store, id)
            .ok()
            .map(|worker| EntityRef::named(worker.name)),
        Screen::Vehicle(id) => VehicleService::get(&context.store, id)
            .ok()
            .map(|vehicle| EntityRef::named(vehicle.label)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_split_positionals_options_and_flags() {
        let raw = ["150", "Fuel", "--entity", "Hilux", "diesel", "--date=2024-05-01", "--yes"];
        let args = Args::parse(&raw, &["entity", "date"], &["yes"]).unwrap();
        assert_eq!(args.required(0, "amount").unwrap(), "150");
        assert_eq!(args.rest(1), "Fuel diesel");
        assert_eq!(args.option("entity"), Some("Hilux"));
        assert_eq!(args.option("date"), Some("2024-05-01"));
        assert!(args.flag("yes"));
        assert!(args.get(5).is_none());
    }

    #[test]
    fn args_reject_unknown_and_dangling_options() {
        assert!(Args::parse(&["--bogus"], &["date"], &[]).is_err());
        assert!(Args::parse(&["--date"], &["date"], &[]).is_err());
    }

    #[test]
    fn money_and_dates_report_bad_input() {
        assert_eq!(parse_money("12,50").unwrap(), Decimal::new(1250, 2));
        assert!(matches!(parse_money("abc"), Err(CommandError::InvalidArguments(_))));
        assert!(parse_day("2024-13-01").is_err());
        assert_eq!(
            parse_day("15/03/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }
}
