pub mod attendance_service;
pub mod contract_service;
pub mod entry_service;
pub mod integrity_service;
pub mod summary_service;
pub mod vehicle_service;
pub mod worker_service;

pub use attendance_service::AttendanceService;
pub use contract_service::ContractService;
pub use entry_service::{EntryService, NewEntry, PaymentKind};
pub use integrity_service::{IntegrityService, IntegrityWarning};
pub use summary_service::{LedgerSummary, SummaryService, VehicleCost};
pub use vehicle_service::VehicleService;
pub use worker_service::{NewWorker, RenameOutcome, WorkerService};

use uuid::Uuid;

use crate::domain::{common::same_name, Identifiable, Vehicle, Worker};
use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Duplicate(String),
}

/// Ledger entries and attendance reference workers and vehicles by name, so a name
/// may belong to at most one of them. Deactivated workers keep their name: their
/// history still resolves through it.
fn ensure_name_free(
    name: &str,
    workers: &[Worker],
    vehicles: &[Vehicle],
    skip: Option<Uuid>,
) -> ServiceResult<()> {
    match workers
        .iter()
        .filter(|worker| Some(worker.id) != skip)
        .find(|worker| same_name(&worker.name, name))
        .map(|worker| worker.active)
    {
        Some(true) => {
            return Err(ServiceError::Duplicate(format!(
                "a worker named `{}` is already on the roster",
                name.trim()
            )))
        }
        Some(false) => {
            return Err(ServiceError::Duplicate(format!(
                "`{}` belongs to a dismissed worker whose history uses that name",
                name.trim()
            )))
        }
        None => {}
    }
    if vehicles
        .iter()
        .filter(|vehicle| Some(vehicle.id) != skip)
        .any(|vehicle| same_name(&vehicle.label, name))
    {
        return Err(ServiceError::Duplicate(format!(
            "a vehicle labeled `{}` already exists",
            name.trim()
        )));
    }
    Ok(())
}

fn require_text(value: &str, what: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::Invalid(format!("{what} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Index of the record carrying `id`; `what` names the collection in the error.
fn position_of<T: Identifiable>(rows: &[T], id: Uuid, what: &str) -> ServiceResult<usize> {
    rows.iter()
        .position(|row| row.id() == id)
        .ok_or_else(|| ServiceError::NotFound(format!("{what} {id}")))
}
