//! Table layouts for every persisted collection.

use uuid::Uuid;

use crate::domain::{
    attendance::MAX_FRACTION,
    categories,
    common::{format_date, same_name},
    AttendanceRecord, ContractConfig, EntityRef, LedgerEntry, PaymentDetails, PaymentMethod,
    Vehicle, Worker,
};

use super::{Column, RowReader, TableRecord, TableSchema};

pub static LEDGER_SCHEMA: TableSchema = TableSchema {
    name: "ledger",
    file_name: "ledger.csv",
    columns: &[
        Column::text("Date").aliased(&["Data"]),
        Column::text("Category").aliased(&["Categoria"]),
        Column::text("Description").aliased(&["Descricao"]),
        Column::numeric("Amount").aliased(&["Valor"]),
        Column::text("Entity").aliased(&["Responsavel"]),
        Column::text("PaymentMethod"),
        Column::text("Id"),
    ],
};

/// Labor payments in the first ledger layout carry `Tipo` "Mão de Obra" and
/// category "Equipe"; both read as [`categories::LABOR`].
const LEGACY_LABOR_TYPES: &[&str] = &["Mão de Obra", "Mao de Obra"];
const LEGACY_LABOR_CATEGORIES: &[&str] = &["Equipe"];

fn ledger_category(row: &mut RowReader<'_>) -> String {
    let category = row.text("Category");
    let kind = row.text("Tipo");
    let legacy_labor = LEGACY_LABOR_TYPES.iter().any(|label| same_name(label, &kind))
        || LEGACY_LABOR_CATEGORIES
            .iter()
            .any(|label| same_name(label, &category));
    if legacy_labor {
        row.relabel("Category", &category, categories::LABOR)
    } else {
        category
    }
}

pub static WORKER_SCHEMA: TableSchema = TableSchema {
    name: "workers",
    file_name: "workers.csv",
    columns: &[
        Column::text("Name"),
        Column::text("Role"),
        Column::numeric("DailyRate"),
        Column::text("StartDate"),
        Column::text("PixKey"),
        Column::text("Bank"),
        Column::text("Active"),
        Column::text("Id"),
    ],
};

pub static ATTENDANCE_SCHEMA: TableSchema = TableSchema {
    name: "attendance",
    file_name: "attendance.csv",
    columns: &[
        Column::text("Date"),
        Column::text("WorkerName"),
        Column::numeric("Fraction"),
        Column::text("Description"),
        Column::text("Id"),
    ],
};

pub static VEHICLE_SCHEMA: TableSchema = TableSchema {
    name: "vehicles",
    file_name: "vehicles.csv",
    columns: &[
        Column::text("Label"),
        Column::text("Plate"),
        Column::numeric("InitialOdometer"),
        Column::text("Id"),
    ],
};

pub static CONTRACT_SCHEMA: TableSchema = TableSchema {
    name: "contract",
    file_name: "contract.csv",
    columns: &[Column::numeric("TotalContractValue")],
};

impl TableRecord for LedgerEntry {
    fn schema() -> &'static TableSchema {
        &LEDGER_SCHEMA
    }

    fn from_row(row: &mut RowReader<'_>) -> Self {
        LedgerEntry {
            id: row.id("Id"),
            date: row.date("Date"),
            category: ledger_category(row),
            description: row.text("Description"),
            amount: row.decimal("Amount"),
            entity: EntityRef::parse(&row.text("Entity")),
            payment_method: PaymentMethod::parse(&row.text("PaymentMethod")),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            format_date(self.date),
            self.category.clone(),
            self.description.clone(),
            self.amount.normalize().to_string(),
            self.entity.to_string(),
            self.payment_method
                .as_ref()
                .map(|method| method.label().to_string())
                .unwrap_or_default(),
            self.id.to_string(),
        ]
    }

    fn row_id(&self) -> Option<Uuid> {
        Some(self.id)
    }
}

impl TableRecord for Worker {
    fn schema() -> &'static TableSchema {
        &WORKER_SCHEMA
    }

    fn from_row(row: &mut RowReader<'_>) -> Self {
        Worker {
            id: row.id("Id"),
            name: row.text("Name"),
            role: row.text("Role"),
            daily_rate: row.decimal("DailyRate"),
            start_date: row.date("StartDate"),
            payment_details: PaymentDetails {
                pix_key: row.optional_text("PixKey"),
                bank: row.optional_text("Bank"),
            },
            active: row.flag("Active", true),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.role.clone(),
            self.daily_rate.normalize().to_string(),
            format_date(self.start_date),
            self.payment_details.pix_key.clone().unwrap_or_default(),
            self.payment_details.bank.clone().unwrap_or_default(),
            self.active.to_string(),
            self.id.to_string(),
        ]
    }

    fn row_id(&self) -> Option<Uuid> {
        Some(self.id)
    }
}

impl TableRecord for AttendanceRecord {
    fn schema() -> &'static TableSchema {
        &ATTENDANCE_SCHEMA
    }

    fn from_row(row: &mut RowReader<'_>) -> Self {
        AttendanceRecord {
            id: row.id("Id"),
            date: row.date("Date"),
            worker_name: row.text("WorkerName"),
            fraction: row.decimal_up_to("Fraction", MAX_FRACTION),
            note: row.text("Description"),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            format_date(self.date),
            self.worker_name.clone(),
            self.fraction.normalize().to_string(),
            self.note.clone(),
            self.id.to_string(),
        ]
    }

    fn row_id(&self) -> Option<Uuid> {
        Some(self.id)
    }
}

impl TableRecord for Vehicle {
    fn schema() -> &'static TableSchema {
        &VEHICLE_SCHEMA
    }

    fn from_row(row: &mut RowReader<'_>) -> Self {
        Vehicle {
            id: row.id("Id"),
            label: row.text("Label"),
            plate: row.text("Plate"),
            initial_odometer: row.decimal("InitialOdometer"),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.label.clone(),
            self.plate.clone(),
            self.initial_odometer.normalize().to_string(),
            self.id.to_string(),
        ]
    }

    fn row_id(&self) -> Option<Uuid> {
        Some(self.id)
    }
}

impl TableRecord for ContractConfig {
    fn schema() -> &'static TableSchema {
        &CONTRACT_SCHEMA
    }

    fn from_row(row: &mut RowReader<'_>) -> Self {
        ContractConfig {
            total_contract_value: row.decimal("TotalContractValue"),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![self.total_contract_value.normalize().to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::heal;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn schemas_line_up_with_row_width() {
        let entry = LedgerEntry::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            "Fuel",
            "diesel",
            Decimal::new(-200, 0),
        );
        assert_eq!(entry.to_row().len(), LEDGER_SCHEMA.columns.len());
        let worker = Worker::new("Ana", "Mason", Decimal::new(150, 0), entry.date);
        assert_eq!(worker.to_row().len(), WORKER_SCHEMA.columns.len());
        let record = AttendanceRecord::new(entry.date, "Ana", Decimal::ONE);
        assert_eq!(record.to_row().len(), ATTENDANCE_SCHEMA.columns.len());
        let vehicle = Vehicle::new("Hilux ABC1D23", "ABC1D23", Decimal::ZERO);
        assert_eq!(vehicle.to_row().len(), VEHICLE_SCHEMA.columns.len());
    }

    #[test]
    fn legacy_ledger_row_reads_through_aliases() {
        let healed = heal(
            &LEDGER_SCHEMA,
            strings(&["Data", "Tipo", "Categoria", "Descricao", "Valor", "Responsavel"]),
            vec![strings(&[
                "2024-02-10 08:15:00.000001",
                "Despesa",
                "Combustível",
                "diesel",
                "-320.5",
                "Geral",
            ])],
        );
        let mut row = RowReader::new(&LEDGER_SCHEMA, 2, &healed.headers, &healed.records[0]);
        let entry = LedgerEntry::from_row(&mut row);
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert_eq!(entry.category, "Combustível");
        assert_eq!(entry.amount, Decimal::new(-3205, 1));
        assert!(entry.entity.is_general());
        assert!(entry.payment_method.is_none());
        assert_eq!(healed.migration.added_columns, strings(&["PaymentMethod", "Id"]));
    }

    #[test]
    fn first_layout_team_payment_reads_as_labor() {
        let healed = heal(
            &LEDGER_SCHEMA,
            strings(&["Data", "Tipo", "Categoria", "Descricao", "Valor", "Responsavel"]),
            vec![strings(&[
                "2024-02-10",
                "Mão de Obra",
                "Equipe",
                "Pagamento Final - Motorista",
                "-250",
                "Motorista",
            ])],
        );
        let mut row = RowReader::new(&LEDGER_SCHEMA, 2, &healed.headers, &healed.records[0]);
        let entry = LedgerEntry::from_row(&mut row);
        assert_eq!(entry.category, categories::LABOR);
        assert_eq!(entry.entity, EntityRef::named("Motorista"));
        assert_eq!(row.into_notes().relabeled_values, 1);
    }

    #[test]
    fn blank_active_flag_reads_as_active() {
        let headers = strings(&["Name", "DailyRate", "Active"]);
        let values = strings(&["Zé", "120", ""]);
        let mut row = RowReader::new(&WORKER_SCHEMA, 2, &headers, &values);
        let worker = Worker::from_row(&mut row);
        assert!(worker.active);
        assert_eq!(worker.daily_rate, Decimal::new(120, 0));
    }
}
