//! Worker roster management.
//!
//! Attendance rows and ledger entries still reference workers by name, so a
//! rename rewrites those tables along with the roster.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::core::services::{ensure_name_free, position_of, require_text, ServiceError, ServiceResult};
use crate::currency::check_amount;
use crate::domain::{EntityRef, PaymentDetails, Worker};
use crate::ledger::{LedgerStore, WorkerStatement};

#[derive(Debug, Clone)]
pub struct NewWorker {
    pub name: String,
    pub role: String,
    pub daily_rate: Decimal,
    pub start_date: NaiveDate,
    pub payment_details: PaymentDetails,
}

impl NewWorker {
    pub fn new(name: impl Into<String>, daily_rate: Decimal, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            role: String::new(),
            daily_rate,
            start_date,
            payment_details: PaymentDetails::default(),
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn payment_details(mut self, details: PaymentDetails) -> Self {
        self.payment_details = details;
        self
    }
}

/// How many referencing rows a rename rewrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOutcome {
    pub entries_updated: usize,
    pub attendance_updated: usize,
}

pub struct WorkerService;

impl WorkerService {
    pub fn hire(store: &LedgerStore, input: NewWorker) -> ServiceResult<Worker> {
        let name = require_text(&input.name, "worker name")?;
        if check_amount(input.daily_rate)? < Decimal::ZERO {
            return Err(ServiceError::Invalid("daily rate cannot be negative".into()));
        }
        ensure_name_free(&name, &store.workers()?, &store.vehicles()?, None)?;
        let mut worker = Worker::new(name, input.role.trim(), input.daily_rate, input.start_date);
        worker.payment_details = input.payment_details;
        store.append_worker(&worker)?;
        info!(worker = %worker.name, rate = %worker.daily_rate, "worker hired");
        Ok(worker)
    }

    pub fn get(store: &LedgerStore, id: Uuid) -> ServiceResult<Worker> {
        let mut workers = store.workers()?;
        let index = position_of(&workers, id, "worker")?;
        Ok(workers.swap_remove(index))
    }

    /// Looks a worker up by name. Hand-edited rosters may hold namesakes; an active one wins.
    pub fn find_by_name(store: &LedgerStore, name: &str) -> ServiceResult<Worker> {
        let matches: Vec<Worker> = store
            .workers()?
            .into_iter()
            .filter(|worker| worker.is_named(name))
            .collect();
        matches
            .iter()
            .find(|worker| worker.active)
            .or_else(|| matches.first())
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("worker `{}`", name.trim())))
    }

    pub fn list_active(store: &LedgerStore) -> ServiceResult<Vec<Worker>> {
        Ok(store
            .workers()?
            .into_iter()
            .filter(|worker| worker.active)
            .collect())
    }

    pub fn statement(store: &LedgerStore, id: Uuid) -> ServiceResult<WorkerStatement> {
        let worker = Self::get(store, id)?;
        Ok(store.worker_statement(&worker)?)
    }

    /// Renames the worker and rewrites every attendance row and ledger entry that
    /// referenced the old name.
    pub fn rename(store: &LedgerStore, id: Uuid, new_name: &str) -> ServiceResult<RenameOutcome> {
        let new_name = require_text(new_name, "worker name")?;
        let mut workers = store.workers()?;
        ensure_name_free(&new_name, &workers, &store.vehicles()?, Some(id))?;
        let index = position_of(&workers, id, "worker")?;
        let worker = &mut workers[index];
        let old_name = std::mem::replace(&mut worker.name, new_name.clone());
        if old_name == new_name {
            return Ok(RenameOutcome::default());
        }

        let mut outcome = RenameOutcome::default();
        let mut attendance = store.attendance()?;
        for record in attendance.iter_mut().filter(|r| r.belongs_to(&old_name)) {
            record.worker_name = new_name.clone();
            outcome.attendance_updated += 1;
        }
        let mut entries = store.entries()?;
        for entry in entries.iter_mut().filter(|e| e.entity.refers_to(&old_name)) {
            entry.entity = EntityRef::named(new_name.clone());
            outcome.entries_updated += 1;
        }

        if outcome.attendance_updated > 0 {
            store.replace_attendance(&attendance)?;
        }
        if outcome.entries_updated > 0 {
            store.replace_all(&entries)?;
        }
        store.replace_workers(&workers)?;
        info!(
            from = %old_name,
            to = %new_name,
            entries = outcome.entries_updated,
            attendance = outcome.attendance_updated,
            "worker renamed"
        );
        Ok(outcome)
    }

    pub fn set_rate(store: &LedgerStore, id: Uuid, daily_rate: Decimal) -> ServiceResult<Worker> {
        if check_amount(daily_rate)? < Decimal::ZERO {
            return Err(ServiceError::Invalid("daily rate cannot be negative".into()));
        }
        Self::update(store, id, |worker| worker.daily_rate = daily_rate)
    }

    /// Takes the worker off the active roster. History stays attributed to them.
    pub fn deactivate(store: &LedgerStore, id: Uuid) -> ServiceResult<Worker> {
        Self::update(store, id, |worker| worker.active = false)
    }

    /// Deletes a worker that nothing references yet. Workers with history must be
    /// deactivated instead.
    pub fn remove(store: &LedgerStore, id: Uuid) -> ServiceResult<Worker> {
        let mut workers = store.workers()?;
        let index = position_of(&workers, id, "worker")?;
        let name = workers[index].name.clone();
        let days = store
            .attendance()?
            .iter()
            .filter(|record| record.belongs_to(&name))
            .count();
        let entries = store
            .entries()?
            .iter()
            .filter(|entry| entry.entity.refers_to(&name))
            .count();
        if days > 0 || entries > 0 {
            return Err(ServiceError::Invalid(format!(
                "`{name}` has {days} attendance record(s) and {entries} ledger entry(ies); deactivate instead"
            )));
        }
        let removed = workers.remove(index);
        store.replace_workers(&workers)?;
        Ok(removed)
    }

    fn update<F>(store: &LedgerStore, id: Uuid, apply: F) -> ServiceResult<Worker>
    where
        F: FnOnce(&mut Worker),
    {
        let mut workers = store.workers()?;
        let index = position_of(&workers, id, "worker")?;
        let worker = &mut workers[index];
        apply(worker);
        let updated = worker.clone();
        store.replace_workers(&workers)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{categories, AttendanceRecord, LedgerEntry};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    fn hire(store: &LedgerStore, name: &str) -> Worker {
        WorkerService::hire(store, NewWorker::new(name, Decimal::new(120, 0), start())).unwrap()
    }

    #[test]
    fn hire_rejects_duplicate_active_name() {
        let store = LedgerStore::in_memory();
        hire(&store, "Maria");
        let err = WorkerService::hire(&store, NewWorker::new(" maria ", Decimal::ONE, start()))
            .expect_err("duplicate");
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }

    #[test]
    fn dismissed_worker_keeps_their_name() {
        let store = LedgerStore::in_memory();
        let first = hire(&store, "Maria");
        WorkerService::deactivate(&store, first.id).unwrap();
        let err = WorkerService::hire(&store, NewWorker::new("MARIA", Decimal::ONE, start()))
            .expect_err("name still in use");
        assert!(matches!(err, ServiceError::Duplicate(_)));

        let other = hire(&store, "Rita");
        assert!(matches!(
            WorkerService::rename(&store, other.id, "maria"),
            Err(ServiceError::Duplicate(_))
        ));
        assert_eq!(WorkerService::find_by_name(&store, "maria").unwrap().id, first.id);
    }

    #[test]
    fn hire_rejects_negative_rate_and_blank_name() {
        let store = LedgerStore::in_memory();
        assert!(matches!(
            WorkerService::hire(&store, NewWorker::new("Zé", Decimal::new(-1, 0), start())),
            Err(ServiceError::Invalid(_))
        ));
        assert!(matches!(
            WorkerService::hire(&store, NewWorker::new("  ", Decimal::ONE, start())),
            Err(ServiceError::Invalid(_))
        ));
    }

    #[test]
    fn rename_cascades_to_attendance_and_entries() {
        let store = LedgerStore::in_memory();
        let worker = hire(&store, "Joao");
        store
            .append_attendance(&AttendanceRecord::new(start(), "Joao", Decimal::ONE))
            .unwrap();
        store
            .append(
                &LedgerEntry::new(start(), categories::LABOR, "Advance - Joao", Decimal::new(-50, 0))
                    .with_entity(EntityRef::named("Joao")),
            )
            .unwrap();
        let balance_before = store.worker_balance(&worker).unwrap();

        let outcome = WorkerService::rename(&store, worker.id, "João Silva").unwrap();
        assert_eq!(outcome.attendance_updated, 1);
        assert_eq!(outcome.entries_updated, 1);

        let renamed = WorkerService::get(&store, worker.id).unwrap();
        assert_eq!(renamed.name, "João Silva");
        assert_eq!(store.worker_balance(&renamed).unwrap(), balance_before);
        assert!(store.attendance().unwrap()[0].belongs_to("João Silva"));
    }

    #[test]
    fn rename_onto_existing_name_fails() {
        let store = LedgerStore::in_memory();
        let joao = hire(&store, "João");
        hire(&store, "Maria");
        assert!(matches!(
            WorkerService::rename(&store, joao.id, "MARIA"),
            Err(ServiceError::Duplicate(_))
        ));
    }

    #[test]
    fn remove_refuses_workers_with_history() {
        let store = LedgerStore::in_memory();
        let worker = hire(&store, "Ana");
        store
            .append_attendance(&AttendanceRecord::new(start(), "Ana", Decimal::ONE))
            .unwrap();
        assert!(matches!(
            WorkerService::remove(&store, worker.id),
            Err(ServiceError::Invalid(_))
        ));

        let fresh = hire(&store, "Bia");
        WorkerService::remove(&store, fresh.id).unwrap();
        assert_eq!(store.workers().unwrap().len(), 1);
    }

    #[test]
    fn set_rate_updates_roster() {
        let store = LedgerStore::in_memory();
        let worker = hire(&store, "Ana");
        WorkerService::set_rate(&store, worker.id, Decimal::new(180, 0)).unwrap();
        assert_eq!(
            WorkerService::get(&store, worker.id).unwrap().daily_rate,
            Decimal::new(180, 0)
        );
    }
}
