use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{same_name, Identifiable};

/// One day's credited fraction for one worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub worker_name: String,
    pub fraction: Decimal,
    #[serde(default)]
    pub note: String,
}

impl AttendanceRecord {
    pub fn new(date: NaiveDate, worker_name: impl Into<String>, fraction: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            worker_name: worker_name.into().trim().to_string(),
            fraction,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn belongs_to(&self, worker_name: &str) -> bool {
        same_name(&self.worker_name, worker_name)
    }

    /// Whether the fraction is one the entry forms offer: none, half, or a full day.
    pub fn has_standard_fraction(&self) -> bool {
        is_standard_fraction(self.fraction)
    }
}

/// Largest fraction a stored attendance row may credit; larger cells read as 0.
pub const MAX_FRACTION: Decimal = Decimal::ONE_HUNDRED;

pub fn is_standard_fraction(fraction: Decimal) -> bool {
    fraction == Decimal::ZERO || fraction == Decimal::new(5, 1) || fraction == Decimal::ONE
}

impl Identifiable for AttendanceRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}
