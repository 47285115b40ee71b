use std::path::Path;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::{
    config::Config,
    core::utils::ensure_dir,
    currency::{check_amount, within},
    domain::{
        attendance::MAX_FRACTION, AttendanceRecord, ContractConfig, LedgerEntry, Vehicle, Worker,
    },
    errors::{LedgerError, Result},
    storage::{CsvTable, MemoryRepository, Repository, SchemaMigration, TableLoad},
};

use super::balances::{self, WorkerStatement};

/// What loading every table found: auto-heal migrations, coercion warnings, and
/// tables that had to be recreated.
#[derive(Debug, Clone, Default)]
pub struct StoreReport {
    pub migrations: Vec<SchemaMigration>,
    pub warnings: Vec<String>,
    pub recovered_tables: Vec<String>,
}

impl StoreReport {
    fn absorb<T>(&mut self, table: &str, load: TableLoad<T>) {
        if let Some(migration) = load.migration {
            self.migrations.push(migration);
        }
        if load.recovered {
            self.recovered_tables.push(table.to_string());
        }
        self.warnings.extend(load.warnings);
    }

    pub fn is_clean(&self) -> bool {
        self.migrations.is_empty() && self.warnings.is_empty() && self.recovered_tables.is_empty()
    }
}

/// Owns the collections and answers balance queries against freshly loaded data.
pub struct LedgerStore {
    entries: Box<dyn Repository<LedgerEntry>>,
    workers: Box<dyn Repository<Worker>>,
    attendance: Box<dyn Repository<AttendanceRecord>>,
    vehicles: Box<dyn Repository<Vehicle>>,
    contract: Box<dyn Repository<ContractConfig>>,
}

impl LedgerStore {
    pub fn new(
        entries: Box<dyn Repository<LedgerEntry>>,
        workers: Box<dyn Repository<Worker>>,
        attendance: Box<dyn Repository<AttendanceRecord>>,
        vehicles: Box<dyn Repository<Vehicle>>,
        contract: Box<dyn Repository<ContractConfig>>,
    ) -> Self {
        Self {
            entries,
            workers,
            attendance,
            vehicles,
            contract,
        }
    }

    /// CSV tables under `data_dir`.
    pub fn open(data_dir: &Path, delimiter: u8, rewrite_healed: bool) -> Result<Self> {
        ensure_dir(data_dir)?;
        info!(data_dir = %data_dir.display(), "opening ledger tables");
        Ok(Self::new(
            Box::new(CsvTable::<LedgerEntry>::in_dir(data_dir, delimiter, rewrite_healed)),
            Box::new(CsvTable::<Worker>::in_dir(data_dir, delimiter, rewrite_healed)),
            Box::new(CsvTable::<AttendanceRecord>::in_dir(data_dir, delimiter, rewrite_healed)),
            Box::new(CsvTable::<Vehicle>::in_dir(data_dir, delimiter, rewrite_healed)),
            Box::new(CsvTable::<ContractConfig>::in_dir(data_dir, delimiter, rewrite_healed)),
        ))
    }

    pub fn from_config(config: &Config, base: &Path) -> Result<Self> {
        let delimiter = config
            .delimiter_byte()
            .map_err(|err| LedgerError::Validation(err.to_string()))?;
        Self::open(
            &config.resolve_data_dir(base),
            delimiter,
            config.rewrite_healed_tables,
        )
    }

    pub fn in_memory() -> Self {
        Self::new(
            Box::new(MemoryRepository::<LedgerEntry>::new()),
            Box::new(MemoryRepository::<Worker>::new()),
            Box::new(MemoryRepository::<AttendanceRecord>::new()),
            Box::new(MemoryRepository::<Vehicle>::new()),
            Box::new(MemoryRepository::<ContractConfig>::new()),
        )
    }

    /// Loads every table once and reports what had to be healed or recovered.
    pub fn check_tables(&self) -> Result<StoreReport> {
        let mut report = StoreReport::default();
        report.absorb("ledger", self.entries.load()?);
        report.absorb("workers", self.workers.load()?);
        report.absorb("attendance", self.attendance.load()?);
        report.absorb("vehicles", self.vehicles.load()?);
        report.absorb("contract", self.contract.load()?);
        Ok(report)
    }

    pub fn append(&self, entry: &LedgerEntry) -> Result<()> {
        if entry.category.trim().is_empty() {
            return Err(LedgerError::Validation("entry category is required".into()));
        }
        check_amount(entry.amount)?;
        debug!(entry = %entry.id, amount = %entry.amount, "appending ledger entry");
        self.entries.append(entry)
    }

    pub fn replace_all(&self, entries: &[LedgerEntry]) -> Result<()> {
        for entry in entries {
            check_amount(entry.amount)?;
        }
        self.entries.replace_all(entries)
    }

    pub fn entries(&self) -> Result<Vec<LedgerEntry>> {
        self.entries.load_all()
    }

    pub fn sum_where<F>(&self, predicate: F) -> Result<Decimal>
    where
        F: Fn(&LedgerEntry) -> bool,
    {
        Ok(balances::sum_where(&self.entries()?, predicate))
    }

    pub fn cash_balance(&self) -> Result<Decimal> {
        Ok(balances::cash_balance(&self.entries()?))
    }

    pub fn worker_balance(&self, worker: &Worker) -> Result<Decimal> {
        Ok(balances::worker_balance(
            worker,
            &self.attendance()?,
            &self.entries()?,
        ))
    }

    pub fn worker_statement(&self, worker: &Worker) -> Result<WorkerStatement> {
        Ok(balances::worker_statement(
            worker,
            &self.attendance()?,
            &self.entries()?,
        ))
    }

    pub fn vehicle_cost_to_date(&self, vehicle: &Vehicle) -> Result<Decimal> {
        Ok(balances::vehicle_cost_to_date(vehicle, &self.entries()?))
    }

    pub fn contract_remaining(&self) -> Result<Decimal> {
        let total = self.contract()?.total_contract_value;
        Ok(balances::contract_remaining(total, &self.entries()?))
    }

    pub fn card_pending(&self) -> Result<Decimal> {
        Ok(balances::card_pending(&self.entries()?))
    }

    pub fn workers(&self) -> Result<Vec<Worker>> {
        self.workers.load_all()
    }

    pub fn append_worker(&self, worker: &Worker) -> Result<()> {
        if worker.name.trim().is_empty() {
            return Err(LedgerError::Validation("worker name is required".into()));
        }
        check_amount(worker.daily_rate)?;
        self.workers.append(worker)
    }

    pub fn replace_workers(&self, workers: &[Worker]) -> Result<()> {
        self.workers.replace_all(workers)
    }

    pub fn attendance(&self) -> Result<Vec<AttendanceRecord>> {
        self.attendance.load_all()
    }

    pub fn append_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        if record.worker_name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "attendance needs a worker name".into(),
            ));
        }
        if within(record.fraction, MAX_FRACTION).is_none() {
            return Err(LedgerError::Validation(format!(
                "attendance fraction {} exceeds {MAX_FRACTION}",
                record.fraction
            )));
        }
        self.attendance.append(record)
    }

    pub fn replace_attendance(&self, records: &[AttendanceRecord]) -> Result<()> {
        self.attendance.replace_all(records)
    }

    pub fn vehicles(&self) -> Result<Vec<Vehicle>> {
        self.vehicles.load_all()
    }

    pub fn append_vehicle(&self, vehicle: &Vehicle) -> Result<()> {
        if vehicle.label.trim().is_empty() {
            return Err(LedgerError::Validation("vehicle label is required".into()));
        }
        self.vehicles.append(vehicle)
    }

    pub fn replace_vehicles(&self, vehicles: &[Vehicle]) -> Result<()> {
        self.vehicles.replace_all(vehicles)
    }

    /// The contract row, or a zero contract when none was saved.
    pub fn contract(&self) -> Result<ContractConfig> {
        Ok(self
            .contract
            .load_all()?
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    pub fn set_contract(&self, contract: &ContractConfig) -> Result<()> {
        check_amount(contract.total_contract_value)?;
        self.contract.replace_all(std::slice::from_ref(contract))
    }

    /// Empties every table. There is no undo.
    pub fn clear_all(&self) -> Result<()> {
        info!("clearing every ledger table");
        self.entries.replace_all(&[])?;
        self.workers.replace_all(&[])?;
        self.attendance.replace_all(&[])?;
        self.vehicles.replace_all(&[])?;
        self.contract.replace_all(&[])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{categories, EntityRef};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    #[test]
    fn empty_store_has_zero_balances() {
        let store = LedgerStore::in_memory();
        assert_eq!(store.cash_balance().unwrap(), Decimal::ZERO);
        assert_eq!(store.contract_remaining().unwrap(), Decimal::ZERO);
        assert_eq!(store.card_pending().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn append_rejects_blank_category() {
        let store = LedgerStore::in_memory();
        let entry = LedgerEntry::new(date(), "  ", "nothing", Decimal::ONE);
        assert!(matches!(
            store.append(&entry),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn append_then_sum_grows_by_amount() {
        let store = LedgerStore::in_memory();
        store
            .append(&LedgerEntry::new(date(), categories::FUEL, "diesel", Decimal::new(-50, 0)))
            .unwrap();
        let before = store.sum_where(|e| e.in_category(categories::FUEL)).unwrap();
        let extra = LedgerEntry::new(date(), categories::FUEL, "more", Decimal::new(-125, 1));
        store.append(&extra).unwrap();
        let after = store.sum_where(|e| e.in_category(categories::FUEL)).unwrap();
        assert_eq!(after - before, extra.amount);
    }

    #[test]
    fn replace_all_without_entry_drops_its_contribution() {
        let store = LedgerStore::in_memory();
        let keep = LedgerEntry::new(date(), categories::REVENUE, "payment", Decimal::new(1000, 0));
        let drop = LedgerEntry::new(date(), categories::MATERIALS, "cement", Decimal::new(-300, 0))
            .with_entity(EntityRef::named("Site"));
        store.append(&keep).unwrap();
        store.append(&drop).unwrap();
        let remaining: Vec<_> = store
            .entries()
            .unwrap()
            .into_iter()
            .filter(|entry| entry.id != drop.id)
            .collect();
        store.replace_all(&remaining).unwrap();
        assert_eq!(store.cash_balance().unwrap(), Decimal::new(1000, 0));
        assert_eq!(
            store.sum_where(|e| e.in_category(categories::MATERIALS)).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn clear_all_empties_every_collection() {
        let store = LedgerStore::in_memory();
        store
            .append(&LedgerEntry::new(date(), categories::OTHER, "x", Decimal::ONE))
            .unwrap();
        store
            .append_worker(&Worker::new("Ana", "Cook", Decimal::new(100, 0), date()))
            .unwrap();
        store.set_contract(&ContractConfig::new(Decimal::new(5000, 0))).unwrap();
        store.clear_all().unwrap();
        assert!(store.entries().unwrap().is_empty());
        assert!(store.workers().unwrap().is_empty());
        assert_eq!(store.contract().unwrap(), ContractConfig::default());
    }
}
