//! Balance formulas over in-memory snapshots.
//!
//! Every figure the application shows is a signed sum over ledger entries
//! selected by a predicate, sometimes combined with a second sum or a constant.
//! Nothing here touches storage.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    categories, AttendanceRecord, LedgerEntry, PaymentMethod, Vehicle, Worker,
};

/// Sum of `amount` over the entries accepted by `predicate`. Zero when nothing matches.
pub fn sum_where<F>(entries: &[LedgerEntry], predicate: F) -> Decimal
where
    F: Fn(&LedgerEntry) -> bool,
{
    entries
        .iter()
        .filter(|entry| predicate(entry))
        .map(|entry| entry.amount)
        .sum()
}

/// Signed total of every movement ever recorded.
pub fn cash_balance(entries: &[LedgerEntry]) -> Decimal {
    sum_where(entries, |_| true)
}

/// Days credited to the worker, summing attendance fractions recorded under their name.
pub fn accrued_days(worker: &Worker, attendance: &[AttendanceRecord]) -> Decimal {
    attendance
        .iter()
        .filter(|record| record.belongs_to(&worker.name))
        .map(|record| record.fraction)
        .sum()
}

/// Labor outflows attributed to the worker, as a positive amount.
pub fn labor_disbursed(worker: &Worker, entries: &[LedgerEntry]) -> Decimal {
    sum_where(entries, |entry| {
        entry.in_category(categories::LABOR)
            && entry.entity.refers_to(&worker.name)
            && entry.is_outflow()
    })
    .abs()
}

/// Gross earned (accrued days times daily rate) minus what was already paid out.
/// Positive means the worker is still owed money; negative means overpaid.
pub fn worker_balance(
    worker: &Worker,
    attendance: &[AttendanceRecord],
    entries: &[LedgerEntry],
) -> Decimal {
    accrued_days(worker, attendance) * worker.daily_rate - labor_disbursed(worker, entries)
}

/// Spending attributed to the vehicle, as a positive amount.
pub fn vehicle_cost_to_date(vehicle: &Vehicle, entries: &[LedgerEntry]) -> Decimal {
    sum_where(entries, |entry| {
        entry.entity.refers_to(&vehicle.label) && entry.is_outflow()
    })
    .abs()
}

/// Contract value not yet collected: the total minus revenue and every inflow.
pub fn contract_remaining(total_contract_value: Decimal, entries: &[LedgerEntry]) -> Decimal {
    total_contract_value
        - sum_where(entries, |entry| {
            entry.in_category(categories::REVENUE) || entry.is_inflow()
        })
}

/// Card purchases not yet settled, as a positive amount.
pub fn card_pending(entries: &[LedgerEntry]) -> Decimal {
    sum_where(entries, |entry| {
        entry.payment_method == Some(PaymentMethod::Card) && entry.is_outflow()
    })
    .abs()
}

/// Signed totals per category, ordered by category label.
pub fn totals_by_category(entries: &[LedgerEntry]) -> Vec<(String, Decimal)> {
    let mut totals: BTreeMap<String, (String, Decimal)> = BTreeMap::new();
    for entry in entries {
        let key = entry.category.trim().to_ascii_lowercase();
        let slot = totals
            .entry(key)
            .or_insert_with(|| (entry.category.trim().to_string(), Decimal::ZERO));
        slot.1 += entry.amount;
    }
    totals.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BalanceStatus {
    Owed,
    Settled,
    Overpaid,
}

impl BalanceStatus {
    pub fn of(balance: Decimal) -> Self {
        if balance > Decimal::ZERO {
            BalanceStatus::Owed
        } else if balance < Decimal::ZERO {
            BalanceStatus::Overpaid
        } else {
            BalanceStatus::Settled
        }
    }
}

/// Breakdown behind [`worker_balance`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerStatement {
    pub worker_id: Uuid,
    pub name: String,
    pub days_worked: Decimal,
    pub daily_rate: Decimal,
    pub gross_earned: Decimal,
    pub disbursed: Decimal,
    pub balance: Decimal,
    pub status: BalanceStatus,
}

pub fn worker_statement(
    worker: &Worker,
    attendance: &[AttendanceRecord],
    entries: &[LedgerEntry],
) -> WorkerStatement {
    let days_worked = accrued_days(worker, attendance);
    let gross_earned = days_worked * worker.daily_rate;
    let disbursed = labor_disbursed(worker, entries);
    let balance = gross_earned - disbursed;
    WorkerStatement {
        worker_id: worker.id,
        name: worker.name.clone(),
        days_worked,
        daily_rate: worker.daily_rate,
        gross_earned,
        disbursed,
        balance,
        status: BalanceStatus::of(balance),
    }
}
