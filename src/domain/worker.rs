use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{same_name, Identifiable};

/// Where a worker's wages are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
}

impl PaymentDetails {
    pub fn is_empty(&self) -> bool {
        self.pix_key.is_none() && self.bank.is_none()
    }
}

/// A person engaged for day labor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Worker {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub daily_rate: Decimal,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub payment_details: PaymentDetails,
    #[serde(default = "Worker::default_active")]
    pub active: bool,
}

impl Worker {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        daily_rate: Decimal,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            role: role.into(),
            daily_rate,
            start_date,
            payment_details: PaymentDetails::default(),
            active: true,
        }
    }

    pub fn default_active() -> bool {
        true
    }

    pub fn is_named(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }
}

impl Identifiable for Worker {
    fn id(&self) -> Uuid {
        self.id
    }
}
