use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::core::services::{
    ensure_name_free, position_of, require_text, RenameOutcome, ServiceError, ServiceResult,
};
use crate::currency::check_amount;
use crate::domain::{EntityRef, Vehicle};
use crate::ledger::LedgerStore;

pub struct VehicleService;

impl VehicleService {
    pub fn register(
        store: &LedgerStore,
        label: &str,
        plate: &str,
        initial_odometer: Decimal,
    ) -> ServiceResult<Vehicle> {
        let label = require_text(label, "vehicle label")?;
        if check_amount(initial_odometer)? < Decimal::ZERO {
            return Err(ServiceError::Invalid("odometer cannot be negative".into()));
        }
        ensure_name_free(&label, &store.workers()?, &store.vehicles()?, None)?;
        let vehicle = Vehicle::new(label, plate, initial_odometer);
        store.append_vehicle(&vehicle)?;
        info!(vehicle = %vehicle.label, "vehicle registered");
        Ok(vehicle)
    }

    pub fn list(store: &LedgerStore) -> ServiceResult<Vec<Vehicle>> {
        Ok(store.vehicles()?)
    }

    pub fn get(store: &LedgerStore, id: Uuid) -> ServiceResult<Vehicle> {
        let mut vehicles = store.vehicles()?;
        let index = position_of(&vehicles, id, "vehicle")?;
        Ok(vehicles.swap_remove(index))
    }

    pub fn find_by_label(store: &LedgerStore, label: &str) -> ServiceResult<Vehicle> {
        store
            .vehicles()?
            .into_iter()
            .find(|vehicle| vehicle.is_labeled(label))
            .ok_or_else(|| ServiceError::NotFound(format!("vehicle `{}`", label.trim())))
    }

    /// Relabels the vehicle and re-points every ledger entry attributed to it.
    pub fn rename(store: &LedgerStore, id: Uuid, new_label: &str) -> ServiceResult<RenameOutcome> {
        let new_label = require_text(new_label, "vehicle label")?;
        let mut vehicles = store.vehicles()?;
        ensure_name_free(&new_label, &store.workers()?, &vehicles, Some(id))?;
        let index = position_of(&vehicles, id, "vehicle")?;
        let vehicle = &mut vehicles[index];
        let old_label = std::mem::replace(&mut vehicle.label, new_label.clone());
        if old_label == new_label {
            return Ok(RenameOutcome::default());
        }

        let mut outcome = RenameOutcome::default();
        let mut entries = store.entries()?;
        for entry in entries.iter_mut().filter(|e| e.entity.refers_to(&old_label)) {
            entry.entity = EntityRef::named(new_label.clone());
            outcome.entries_updated += 1;
        }
        if outcome.entries_updated > 0 {
            store.replace_all(&entries)?;
        }
        store.replace_vehicles(&vehicles)?;
        info!(from = %old_label, to = %new_label, entries = outcome.entries_updated, "vehicle renamed");
        Ok(outcome)
    }

    /// Deletes a vehicle no ledger entry references.
    pub fn remove(store: &LedgerStore, id: Uuid) -> ServiceResult<Vehicle> {
        let mut vehicles = store.vehicles()?;
        let index = position_of(&vehicles, id, "vehicle")?;
        let label = vehicles[index].label.clone();
        let referenced = store
            .entries()?
            .iter()
            .filter(|entry| entry.entity.refers_to(&label))
            .count();
        if referenced > 0 {
            return Err(ServiceError::Invalid(format!(
                "`{label}` is referenced by {referenced} ledger entry(ies)"
            )));
        }
        let removed = vehicles.remove(index);
        store.replace_vehicles(&vehicles)?;
        Ok(removed)
    }
}
