use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::services::{position_of, ServiceError, ServiceResult};
use crate::domain::{attendance::is_standard_fraction, AttendanceRecord};
use crate::ledger::LedgerStore;

pub struct AttendanceService;

impl AttendanceService {
    /// Credits `fraction` of a day (0, 0.5 or 1) to an active worker.
    pub fn record(
        store: &LedgerStore,
        worker_name: &str,
        date: NaiveDate,
        fraction: Decimal,
        note: &str,
    ) -> ServiceResult<AttendanceRecord> {
        if !is_standard_fraction(fraction) {
            return Err(ServiceError::Invalid(format!(
                "day fraction must be 0, 0.5 or 1, got {fraction}"
            )));
        }
        let worker = store
            .workers()?
            .into_iter()
            .find(|worker| worker.active && worker.is_named(worker_name))
            .ok_or_else(|| {
                ServiceError::NotFound(format!("no active worker named `{}`", worker_name.trim()))
            })?;
        if store
            .attendance()?
            .iter()
            .any(|record| record.date == date && record.belongs_to(&worker.name))
        {
            return Err(ServiceError::Duplicate(format!(
                "attendance for `{}` on {date}",
                worker.name
            )));
        }
        let record = AttendanceRecord::new(date, worker.name, fraction).with_note(note.trim());
        store.append_attendance(&record)?;
        Ok(record)
    }

    /// The worker's attendance, oldest first.
    pub fn for_worker(store: &LedgerStore, worker_name: &str) -> ServiceResult<Vec<AttendanceRecord>> {
        let mut records: Vec<_> = store
            .attendance()?
            .into_iter()
            .filter(|record| record.belongs_to(worker_name))
            .collect();
        records.sort_by_key(|record| record.date);
        Ok(records)
    }

    pub fn delete(store: &LedgerStore, id: Uuid) -> ServiceResult<AttendanceRecord> {
        let mut records = store.attendance()?;
        let index = position_of(&records, id, "attendance record")?;
        let removed = records.remove(index);
        store.replace_attendance(&records)?;
        Ok(removed)
    }
}
