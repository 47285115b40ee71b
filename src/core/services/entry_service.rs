//! Recording, editing, and removing ledger movements.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::services::{position_of, require_text, ServiceError, ServiceResult};
use crate::currency::check_amount;
use crate::domain::{categories, EntityRef, LedgerEntry, PaymentMethod};
use crate::ledger::{EntryFilter, LedgerStore};

/// A movement as typed by the operator. `amount` is always entered as a positive
/// number; the service applies the sign.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub entity: EntityRef,
    pub payment_method: Option<PaymentMethod>,
}

impl NewEntry {
    pub fn new(date: NaiveDate, category: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date,
            category: category.into(),
            description: String::new(),
            amount,
            entity: EntityRef::General,
            payment_method: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn entity(mut self, entity: EntityRef) -> Self {
        self.entity = entity;
        self
    }

    pub fn paid_with(mut self, method: Option<PaymentMethod>) -> Self {
        self.payment_method = method;
        self
    }
}

/// Whether a labor payment is a draw against future wages or the closing settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentKind {
    Advance,
    FinalPayment,
}

impl PaymentKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "advance" | "vale" | "draw" => Some(PaymentKind::Advance),
            "final" | "final-payment" | "settlement" => Some(PaymentKind::FinalPayment),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentKind::Advance => f.write_str("Advance"),
            PaymentKind::FinalPayment => f.write_str("Final payment"),
        }
    }
}

pub struct EntryService;

impl EntryService {
    /// Records money going out. The stored amount is negative.
    pub fn record_expense(store: &LedgerStore, input: NewEntry) -> ServiceResult<LedgerEntry> {
        let amount = positive(input.amount)?;
        Self::record(store, input, -amount)
    }

    /// Records money coming in. An empty category is filed as revenue.
    pub fn record_receipt(store: &LedgerStore, mut input: NewEntry) -> ServiceResult<LedgerEntry> {
        let amount = positive(input.amount)?;
        if input.category.trim().is_empty() {
            input.category = categories::REVENUE.to_string();
        }
        Self::record(store, input, amount)
    }

    /// Pays a worker, as an advance or as the final settlement.
    pub fn record_labor_payment(
        store: &LedgerStore,
        worker_name: &str,
        kind: PaymentKind,
        amount: Decimal,
        date: NaiveDate,
        method: Option<PaymentMethod>,
    ) -> ServiceResult<LedgerEntry> {
        let amount = positive(amount)?;
        let worker = store
            .workers()?
            .into_iter()
            .find(|worker| worker.active && worker.is_named(worker_name))
            .ok_or_else(|| {
                ServiceError::NotFound(format!("no active worker named `{}`", worker_name.trim()))
            })?;
        let entry = LedgerEntry::new(
            date,
            categories::LABOR,
            format!("{} - {}", kind, worker.name),
            -amount,
        )
        .with_entity(EntityRef::named(worker.name.clone()))
        .with_payment_method(method);
        store.append(&entry)?;
        tracing::info!(worker = %worker.name, amount = %amount, %kind, "labor payment recorded");
        Ok(entry)
    }

    /// Applies `mutator` to the entry with `id` and rewrites the ledger.
    pub fn edit<F>(store: &LedgerStore, id: Uuid, mutator: F) -> ServiceResult<LedgerEntry>
    where
        F: FnOnce(&mut LedgerEntry),
    {
        let mut entries = store.entries()?;
        let index = position_of(&entries, id, "ledger entry")?;
        let entry = &mut entries[index];
        mutator(entry);
        entry.id = id;
        require_text(&entry.category, "category")?;
        check_amount(entry.amount)?;
        let updated = entry.clone();
        store.replace_all(&entries)?;
        Ok(updated)
    }

    /// Removes the entry with `id`, returning it.
    pub fn delete(store: &LedgerStore, id: Uuid) -> ServiceResult<LedgerEntry> {
        let mut entries = store.entries()?;
        let index = position_of(&entries, id, "ledger entry")?;
        let removed = entries.remove(index);
        store.replace_all(&entries)?;
        Ok(removed)
    }

    /// Entries matching `filter`, in recorded order.
    pub fn list(store: &LedgerStore, filter: &EntryFilter) -> ServiceResult<Vec<LedgerEntry>> {
        Ok(store
            .entries()?
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect())
    }

    /// Labor payouts, newest first. Entries from the same day keep last-recorded-first order.
    pub fn recent_labor_payments(
        store: &LedgerStore,
        limit: usize,
    ) -> ServiceResult<Vec<LedgerEntry>> {
        let filter = EntryFilter::new().category(categories::LABOR).outflows();
        let mut payments = Self::list(store, &filter)?;
        payments.reverse();
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        payments.truncate(limit);
        Ok(payments)
    }

    fn record(store: &LedgerStore, input: NewEntry, amount: Decimal) -> ServiceResult<LedgerEntry> {
        let category = require_text(&input.category, "category")?;
        if let EntityRef::Named(name) = &input.entity {
            ensure_known_entity(store, name)?;
        }
        let entry = LedgerEntry::new(input.date, category, input.description, amount)
            .with_entity(input.entity)
            .with_payment_method(input.payment_method);
        store.append(&entry)?;
        Ok(entry)
    }
}

fn positive(amount: Decimal) -> ServiceResult<Decimal> {
    let amount = check_amount(amount)?;
    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(ServiceError::Invalid(format!(
            "amount must be greater than zero, got {amount}"
        )))
    }
}

fn ensure_known_entity(store: &LedgerStore, name: &str) -> ServiceResult<()> {
    let known_worker = store
        .workers()?
        .iter()
        .any(|worker| worker.active && worker.is_named(name));
    let known_vehicle = store.vehicles()?.iter().any(|vehicle| vehicle.is_labeled(name));
    if known_worker || known_vehicle {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!(
            "`{}` is neither an active worker nor a vehicle",
            name.trim()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Vehicle, Worker};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn store_with_crew() -> LedgerStore {
        let store = LedgerStore::in_memory();
        store
            .append_worker(&Worker::new("João", "Mason", Decimal::new(150, 0), day(1)))
            .unwrap();
        store
            .append_vehicle(&Vehicle::new("Hilux ABC1D23", "ABC1D23", Decimal::ZERO))
            .unwrap();
        store
    }

    #[test]
    fn expense_is_stored_negative() {
        let store = store_with_crew();
        let entry = EntryService::record_expense(
            &store,
            NewEntry::new(day(2), "Fuel", Decimal::new(200, 0))
                .entity(EntityRef::named("Hilux ABC1D23")),
        )
        .unwrap();
        assert_eq!(entry.amount, Decimal::new(-200, 0));
        assert_eq!(store.cash_balance().unwrap(), Decimal::new(-200, 0));
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let store = store_with_crew();
        for amount in [Decimal::ZERO, Decimal::new(-5, 0)] {
            let err = EntryService::record_expense(&store, NewEntry::new(day(2), "Fuel", amount))
                .expect_err("must reject");
            assert!(matches!(err, ServiceError::Invalid(_)), "{err:?}");
        }
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let store = store_with_crew();
        let err = EntryService::record_expense(
            &store,
            NewEntry::new(day(2), "Fuel", Decimal::ONE).entity(EntityRef::named("Tractor")),
        )
        .expect_err("unknown entity");
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn receipt_without_category_is_revenue() {
        let store = store_with_crew();
        let entry =
            EntryService::record_receipt(&store, NewEntry::new(day(3), "", Decimal::new(900, 0)))
                .unwrap();
        assert_eq!(entry.category, categories::REVENUE);
        assert!(entry.is_inflow());
    }

    #[test]
    fn labor_payment_is_attributed_to_worker() {
        let store = store_with_crew();
        let entry = EntryService::record_labor_payment(
            &store,
            "joão",
            PaymentKind::Advance,
            Decimal::new(100, 0),
            day(4),
            None,
        )
        .unwrap();
        assert_eq!(entry.description, "Advance - João");
        assert!(entry.entity.refers_to("João"));
        assert!(entry.in_category(categories::LABOR));
    }

    #[test]
    fn edit_and_delete_by_id() {
        let store = store_with_crew();
        let entry =
            EntryService::record_expense(&store, NewEntry::new(day(2), "Materials", Decimal::TEN))
                .unwrap();
        let edited = EntryService::edit(&store, entry.id, |e| e.description = "sand".into()).unwrap();
        assert_eq!(edited.description, "sand");
        assert_eq!(store.entries().unwrap()[0].description, "sand");

        EntryService::delete(&store, entry.id).unwrap();
        assert!(store.entries().unwrap().is_empty());
        assert!(matches!(
            EntryService::delete(&store, entry.id),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn recent_labor_payments_are_newest_first() {
        let store = store_with_crew();
        for (d, cents) in [(5, 1000), (9, 2000), (7, 3000)] {
            EntryService::record_labor_payment(
                &store,
                "João",
                PaymentKind::Advance,
                Decimal::new(cents, 2),
                day(d),
                None,
            )
            .unwrap();
        }
        let recent = EntryService::recent_labor_payments(&store, 2).unwrap();
        let dates: Vec<_> = recent.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(9), day(7)]);
    }
}
