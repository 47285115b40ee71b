//! Cross-table consistency checks.
//!
//! Tables reference each other by name and are rewritten independently, so a
//! crash between writes or a hand-edited file can leave dangling references.
//! The scan reports them; it never repairs anything.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{categories, EntityRef};
use crate::ledger::LedgerStore;

use super::ServiceResult;

#[derive(Debug, Clone, PartialEq)]
pub enum IntegrityWarning {
    /// A ledger entry names an entity that is neither a worker nor a vehicle.
    UnknownEntity { entry_id: Uuid, name: String },
    /// Attendance recorded for a name missing from the roster.
    UnknownWorker { record_id: Uuid, name: String },
    DuplicateActiveWorker { name: String },
    DuplicateVehicle { label: String },
    /// A worker and a vehicle share a name, so their ledger entries cannot be told apart.
    SharedName { name: String },
    NonStandardFraction { record_id: Uuid, fraction: Decimal },
    /// Labor recorded as income, or revenue recorded as spending.
    SuspiciousSign {
        entry_id: Uuid,
        category: String,
        amount: Decimal,
    },
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityWarning::UnknownEntity { entry_id, name } => {
                write!(f, "entry {entry_id} references unknown entity `{name}`")
            }
            IntegrityWarning::UnknownWorker { record_id, name } => {
                write!(f, "attendance {record_id} references unknown worker `{name}`")
            }
            IntegrityWarning::DuplicateActiveWorker { name } => {
                write!(f, "more than one active worker is named `{name}`")
            }
            IntegrityWarning::DuplicateVehicle { label } => {
                write!(f, "more than one vehicle is labeled `{label}`")
            }
            IntegrityWarning::SharedName { name } => {
                write!(f, "`{name}` is both a worker and a vehicle")
            }
            IntegrityWarning::NonStandardFraction {
                record_id,
                fraction,
            } => write!(f, "attendance {record_id} credits an unusual fraction {fraction}"),
            IntegrityWarning::SuspiciousSign {
                entry_id,
                category,
                amount,
            } => write!(f, "entry {entry_id} in `{category}` has unexpected sign {amount}"),
        }
    }
}

pub struct IntegrityService;

impl IntegrityService {
    pub fn scan(store: &LedgerStore) -> ServiceResult<Vec<IntegrityWarning>> {
        let workers = store.workers()?;
        let vehicles = store.vehicles()?;
        let attendance = store.attendance()?;
        let entries = store.entries()?;
        let mut warnings = Vec::new();

        let mut active_names: HashMap<String, usize> = HashMap::new();
        for worker in workers.iter().filter(|worker| worker.active) {
            *active_names.entry(key(&worker.name)).or_default() += 1;
        }
        let mut duplicated: Vec<_> = active_names
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(name, _)| name.clone())
            .collect();
        duplicated.sort();
        warnings.extend(
            duplicated
                .into_iter()
                .map(|name| IntegrityWarning::DuplicateActiveWorker { name }),
        );

        for (index, vehicle) in vehicles.iter().enumerate() {
            if vehicles[..index]
                .iter()
                .any(|earlier| earlier.is_labeled(&vehicle.label))
            {
                warnings.push(IntegrityWarning::DuplicateVehicle {
                    label: vehicle.label.clone(),
                });
            }
            if workers.iter().any(|worker| worker.is_named(&vehicle.label)) {
                warnings.push(IntegrityWarning::SharedName {
                    name: vehicle.label.clone(),
                });
            }
        }

        for record in &attendance {
            if !workers.iter().any(|worker| worker.is_named(&record.worker_name)) {
                warnings.push(IntegrityWarning::UnknownWorker {
                    record_id: record.id,
                    name: record.worker_name.clone(),
                });
            }
            if !record.has_standard_fraction() {
                warnings.push(IntegrityWarning::NonStandardFraction {
                    record_id: record.id,
                    fraction: record.fraction,
                });
            }
        }

        for entry in &entries {
            if let EntityRef::Named(name) = &entry.entity {
                let known = workers.iter().any(|worker| worker.is_named(name))
                    || vehicles.iter().any(|vehicle| vehicle.is_labeled(name));
                if !known {
                    warnings.push(IntegrityWarning::UnknownEntity {
                        entry_id: entry.id,
                        name: name.clone(),
                    });
                }
            }
            let labor_income = entry.in_category(categories::LABOR) && entry.is_inflow();
            let revenue_spent = entry.in_category(categories::REVENUE) && entry.is_outflow();
            if labor_income || revenue_spent {
                warnings.push(IntegrityWarning::SuspiciousSign {
                    entry_id: entry.id,
                    category: entry.category.clone(),
                    amount: entry.amount,
                });
            }
        }

        for warning in &warnings {
            tracing::warn!(%warning, "integrity check");
        }
        Ok(warnings)
    }
}

fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
