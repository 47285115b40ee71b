use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{same_name, Identifiable};

/// A fleet asset, keyed for humans by its label (usually model and plate).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub label: String,
    pub plate: String,
    pub initial_odometer: Decimal,
}

impl Vehicle {
    pub fn new(label: impl Into<String>, plate: impl Into<String>, initial_odometer: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into().trim().to_string(),
            plate: plate.into().trim().to_string(),
            initial_odometer,
        }
    }

    pub fn is_labeled(&self, label: &str) -> bool {
        same_name(&self.label, label)
    }
}

impl Identifiable for Vehicle {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Single-row settings for the contract being executed on site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContractConfig {
    pub total_contract_value: Decimal,
}

impl ContractConfig {
    pub fn new(total_contract_value: Decimal) -> Self {
        Self {
            total_contract_value,
        }
    }
}
