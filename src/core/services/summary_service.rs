use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::ledger::{balances, BalanceStatus, LedgerStore, WorkerStatement};

use super::ServiceResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleCost {
    pub vehicle_id: Uuid,
    pub label: String,
    pub plate: String,
    pub cost_to_date: Decimal,
}

/// Every dashboard figure computed from one consistent load of the tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub cash_balance: Decimal,
    pub total_inflow: Decimal,
    pub total_outflow: Decimal,
    pub card_pending: Decimal,
    pub contract_total: Decimal,
    pub contract_remaining: Decimal,
    pub by_category: Vec<(String, Decimal)>,
    pub workers: Vec<WorkerStatement>,
    pub vehicles: Vec<VehicleCost>,
}

impl LedgerSummary {
    /// What the site still owes its active workers. Overpaid workers do not offset it.
    pub fn wages_owed(&self) -> Decimal {
        self.workers
            .iter()
            .filter(|statement| statement.status == BalanceStatus::Owed)
            .map(|statement| statement.balance)
            .sum()
    }

    pub fn overpaid(&self) -> impl Iterator<Item = &WorkerStatement> {
        self.workers
            .iter()
            .filter(|statement| statement.status == BalanceStatus::Overpaid)
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn snapshot(store: &LedgerStore) -> ServiceResult<LedgerSummary> {
        let entries = store.entries()?;
        let attendance = store.attendance()?;
        let contract_total = store.contract()?.total_contract_value;

        let workers: Vec<WorkerStatement> = store
            .workers()?
            .iter()
            .filter(|worker| worker.active)
            .map(|worker| balances::worker_statement(worker, &attendance, &entries))
            .collect();
        for statement in workers
            .iter()
            .filter(|statement| statement.status == BalanceStatus::Overpaid)
        {
            warn!(
                worker = %statement.name,
                balance = %statement.balance,
                "worker has been paid more than earned"
            );
        }

        let vehicles = store
            .vehicles()?
            .into_iter()
            .map(|vehicle| VehicleCost {
                cost_to_date: balances::vehicle_cost_to_date(&vehicle, &entries),
                vehicle_id: vehicle.id,
                label: vehicle.label,
                plate: vehicle.plate,
            })
            .collect();

        Ok(LedgerSummary {
            cash_balance: balances::cash_balance(&entries),
            total_inflow: balances::sum_where(&entries, |entry| entry.is_inflow()),
            total_outflow: balances::sum_where(&entries, |entry| entry.is_outflow()).abs(),
            card_pending: balances::card_pending(&entries),
            contract_total,
            contract_remaining: balances::contract_remaining(contract_total, &entries),
            by_category: balances::totals_by_category(&entries),
            workers,
            vehicles,
        })
    }
}
