use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{EntityRef, LedgerEntry, PaymentMethod};

/// Direction of a movement, read from the sign of its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Inflow,
    Outflow,
}

impl Sign {
    pub fn matches(self, amount: Decimal) -> bool {
        match self {
            Sign::Inflow => amount > Decimal::ZERO,
            Sign::Outflow => amount < Decimal::ZERO,
        }
    }
}

/// Conjunction of optional conditions over ledger entries. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub category: Option<String>,
    pub entity: Option<EntityRef>,
    pub sign: Option<Sign>,
    pub payment_method: Option<PaymentMethod>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub description_contains: Option<String>,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn named(self, name: impl Into<String>) -> Self {
        self.entity(EntityRef::named(name))
    }

    pub fn outflows(mut self) -> Self {
        self.sign = Some(Sign::Outflow);
        self
    }

    pub fn inflows(mut self) -> Self {
        self.sign = Some(Sign::Inflow);
        self
    }

    pub fn paid_with(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    /// Inclusive date bounds.
    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn description_contains(mut self, needle: impl Into<String>) -> Self {
        self.description_contains = Some(needle.into());
        self
    }

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if let Some(category) = &self.category {
            if !entry.in_category(category) {
                return false;
            }
        }
        if let Some(entity) = &self.entity {
            let hit = match entity {
                EntityRef::General => entry.entity.is_general(),
                EntityRef::Named(name) => entry.entity.refers_to(name),
            };
            if !hit {
                return false;
            }
        }
        if let Some(sign) = self.sign {
            if !sign.matches(entry.amount) {
                return false;
            }
        }
        if let Some(method) = &self.payment_method {
            if entry.payment_method.as_ref() != Some(method) {
                return false;
            }
        }
        if self.from.is_some_and(|from| entry.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| entry.date > to) {
            return false;
        }
        if let Some(needle) = &self.description_contains {
            let needle = needle.to_lowercase();
            if !entry.description.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: &str, amount: i64) -> LedgerEntry {
        LedgerEntry::new(
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            category,
            "Vale (Adiantamento) - João",
            Decimal::new(amount, 0),
        )
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(EntryFilter::new().matches(&entry("Fuel", -10)));
        assert!(EntryFilter::new().matches(&entry("Revenue", 10)));
    }

    #[test]
    fn conditions_are_conjunctive() {
        let filter = EntryFilter::new().category("labor").named("João").outflows();
        let paid = entry("Labor", -100).with_entity(EntityRef::named("joão"));
        let other_worker = entry("Labor", -100).with_entity(EntityRef::named("Maria"));
        let refund = entry("Labor", 100).with_entity(EntityRef::named("João"));
        assert!(filter.matches(&paid));
        assert!(!filter.matches(&other_worker));
        assert!(!filter.matches(&refund));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let filter = EntryFilter::new().between(Some(day), Some(day));
        assert!(filter.matches(&entry("Fuel", -1)));
        let later = EntryFilter::new().between(day.succ_opt(), None);
        assert!(!later.matches(&entry("Fuel", -1)));
    }

    #[test]
    fn description_match_is_case_insensitive_substring() {
        let filter = EntryFilter::new().description_contains("adiantamento");
        assert!(filter.matches(&entry("Labor", -1)));
        assert!(!EntryFilter::new()
            .description_contains("final")
            .matches(&entry("Labor", -1)));
    }

    #[test]
    fn general_entity_filter_only_hits_unattributed_entries() {
        let filter = EntryFilter::new().entity(EntityRef::General);
        assert!(filter.matches(&entry("Fuel", -5)));
        assert!(!filter.matches(&entry("Fuel", -5).with_entity(EntityRef::named("Truck"))));
    }
}
