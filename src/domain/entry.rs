use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{same_name, EntityRef, Identifiable, PaymentMethod};

/// Well-known category labels. Categories stay free text; these are the ones the
/// balance formulas look for.
pub mod categories {
    pub const LABOR: &str = "Labor";
    pub const FUEL: &str = "Fuel";
    pub const MAINTENANCE: &str = "Maintenance";
    pub const MATERIALS: &str = "Materials";
    pub const FEED: &str = "Feed";
    pub const REVENUE: &str = "Revenue";
    pub const OTHER: &str = "Other";
}

/// One signed monetary movement: positive is money in, negative is money out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(default)]
    pub entity: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

impl LedgerEntry {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            category: category.into().trim().to_string(),
            description: description.into(),
            amount,
            entity: EntityRef::General,
            payment_method: None,
        }
    }

    pub fn with_entity(mut self, entity: EntityRef) -> Self {
        self.entity = entity;
        self
    }

    pub fn with_payment_method(mut self, method: Option<PaymentMethod>) -> Self {
        self.payment_method = method;
        self
    }

    pub fn is_inflow(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_outflow(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn in_category(&self, category: &str) -> bool {
        same_name(&self.category, category)
    }
}

impl Identifiable for LedgerEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}
