//! Ledger aggregation: the balance formulas and the store they run against.

pub mod balances;
pub mod filter;
pub mod store;

pub use balances::{
    accrued_days, card_pending, cash_balance, contract_remaining, labor_disbursed, sum_where,
    totals_by_category, vehicle_cost_to_date, worker_balance, worker_statement, BalanceStatus,
    WorkerStatement,
};
pub use filter::{EntryFilter, Sign};
pub use store::{LedgerStore, StoreReport};
