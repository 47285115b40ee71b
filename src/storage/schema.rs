//! Table schemas and the load-time auto-heal migration.
//!
//! Every persisted collection declares the columns it expects. When a stored table
//! lacks some of them (written by an older revision, or by hand), [`heal`] adds the
//! missing columns with a default value and reports what changed so the caller can
//! log it and decide whether to rewrite the file.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::currency::{coerce_decimal, within, MAX_AMOUNT};
use crate::domain::common::parse_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl ColumnKind {
    pub fn default_value(self) -> &'static str {
        match self {
            ColumnKind::Numeric => "0",
            ColumnKind::Text => "",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Header names used by earlier revisions for the same column.
    pub aliases: &'static [&'static str],
}

impl Column {
    pub const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Numeric,
            aliases: &[],
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
            aliases: &[],
        }
    }

    pub const fn aliased(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    fn matches_header(&self, header: &str) -> bool {
        let header = header.trim();
        header.eq_ignore_ascii_case(self.name)
            || self
                .aliases
                .iter()
                .any(|alias| header.eq_ignore_ascii_case(alias))
    }
}

#[derive(Debug)]
pub struct TableSchema {
    /// Logical collection name, used in logs and migration reports.
    pub name: &'static str,
    pub file_name: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }
}

/// Record of one auto-heal applied to a stored table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMigration {
    pub table: String,
    pub added_columns: Vec<String>,
    /// Legacy headers mapped onto current column names, as `(from, to)`.
    pub renamed_columns: Vec<(String, String)>,
    pub assigned_ids: usize,
    /// Cells rewritten from a legacy value to its current equivalent.
    pub relabeled_values: usize,
    pub rewritten: bool,
}

impl SchemaMigration {
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty()
            && self.renamed_columns.is_empty()
            && self.assigned_ids == 0
            && self.relabeled_values == 0
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.added_columns.is_empty() {
            parts.push(format!("added columns {}", self.added_columns.join(", ")));
        }
        if !self.renamed_columns.is_empty() {
            let renames: Vec<String> = self
                .renamed_columns
                .iter()
                .map(|(from, to)| format!("{from} -> {to}"))
                .collect();
            parts.push(format!("renamed {}", renames.join(", ")));
        }
        if self.assigned_ids > 0 {
            parts.push(format!("assigned ids to {} rows", self.assigned_ids));
        }
        if self.relabeled_values > 0 {
            parts.push(format!("relabeled {} legacy values", self.relabeled_values));
        }
        format!("table `{}`: {}", self.table, parts.join("; "))
    }
}

/// Raw table contents after healing, with headers in canonical names.
#[derive(Debug, Clone)]
pub struct HealedTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
    pub migration: SchemaMigration,
    /// Stored headers the schema does not know about.
    pub unknown_columns: Vec<String>,
}

/// Renames legacy headers and appends every missing expected column with its default.
/// Values already present are never altered.
pub fn heal(schema: &TableSchema, headers: Vec<String>, records: Vec<Vec<String>>) -> HealedTable {
    let mut migration = SchemaMigration {
        table: schema.name.to_string(),
        ..SchemaMigration::default()
    };
    let mut headers = headers;
    let mut unknown_columns = Vec::new();
    let stored = headers.clone();

    for header in headers.iter_mut() {
        match schema
            .columns
            .iter()
            .find(|column| column.matches_header(header))
        {
            Some(column) if header.as_str() != column.name && stored.iter().any(|h| h == column.name) => {
                unknown_columns.push(header.clone());
            }
            Some(column) if header.as_str() != column.name => {
                migration
                    .renamed_columns
                    .push((header.clone(), column.name.to_string()));
                *header = column.name.to_string();
            }
            Some(_) => {}
            None => unknown_columns.push(header.clone()),
        }
    }

    let mut records = records;
    for record in records.iter_mut() {
        record.resize(headers.len(), String::new());
    }

    for column in schema.columns {
        if headers.iter().any(|header| header == column.name) {
            continue;
        }
        headers.push(column.name.to_string());
        for record in records.iter_mut() {
            record.push(column.kind.default_value().to_string());
        }
        migration.added_columns.push(column.name.to_string());
    }

    HealedTable {
        headers,
        records,
        migration,
        unknown_columns,
    }
}

/// Typed, coercing view over one stored record.
///
/// Unreadable cells fall back to a default and leave a note describing the
/// substitution; the caller surfaces the notes as load warnings.
pub struct RowReader<'a> {
    table: &'static str,
    line: usize,
    cells: HashMap<&'a str, &'a str>,
    raw: String,
    notes: RowNotes,
}

/// What reading one row had to substitute or derive.
#[derive(Debug, Default)]
pub struct RowNotes {
    pub warnings: Vec<String>,
    pub assigned_ids: usize,
    pub relabeled_values: usize,
}

impl<'a> RowReader<'a> {
    pub fn new(
        schema: &'static TableSchema,
        line: usize,
        headers: &'a [String],
        values: &'a [String],
    ) -> Self {
        let cells = headers
            .iter()
            .map(String::as_str)
            .zip(values.iter().map(String::as_str))
            .collect();
        Self {
            table: schema.name,
            line,
            cells,
            raw: values.join("\u{1f}"),
            notes: RowNotes::default(),
        }
    }

    pub fn text(&self, column: &str) -> String {
        self.cell(column).trim().to_string()
    }

    pub fn optional_text(&self, column: &str) -> Option<String> {
        let value = self.text(column);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Reads an amount or rate, bounded by [`MAX_AMOUNT`].
    pub fn decimal(&mut self, column: &str) -> Decimal {
        self.decimal_up_to(column, MAX_AMOUNT)
    }

    /// Reads a number whose magnitude may not exceed `limit`; larger values read as 0.
    pub fn decimal_up_to(&mut self, column: &str, limit: Decimal) -> Decimal {
        let raw = self.cell(column);
        if raw.trim().is_empty() {
            return Decimal::ZERO;
        }
        match coerce_decimal(raw).map(|value| within(value, limit)) {
            Some(Some(value)) => value,
            Some(None) => {
                self.note(format!(
                    "column `{column}` value `{}` exceeds {limit}, read as 0",
                    raw.trim()
                ));
                Decimal::ZERO
            }
            None => {
                self.note(format!("column `{column}` value `{}` read as 0", raw.trim()));
                Decimal::ZERO
            }
        }
    }

    pub fn date(&mut self, column: &str) -> NaiveDate {
        let raw = self.cell(column);
        match parse_date(raw) {
            Some(date) => date,
            None => {
                self.note(format!(
                    "column `{column}` value `{}` is not a date, using {}",
                    raw.trim(),
                    NaiveDate::default()
                ));
                NaiveDate::default()
            }
        }
    }

    pub fn flag(&mut self, column: &str, default: bool) -> bool {
        let raw = self.cell(column).trim().to_ascii_lowercase();
        match raw.as_str() {
            "" => default,
            "true" | "yes" | "1" | "y" => true,
            "false" | "no" | "0" | "n" => false,
            other => {
                self.note(format!("column `{column}` value `{other}` read as {default}"));
                default
            }
        }
    }

    /// Reads a surrogate id. Rows without one get an id derived from their position
    /// and content, so repeated loads of an unchanged file agree on it.
    pub fn id(&mut self, column: &str) -> Uuid {
        if let Ok(id) = Uuid::parse_str(self.cell(column).trim()) {
            return id;
        }
        self.notes.assigned_ids += 1;
        let seed = format!("{}:{}:{}", self.table, self.line, self.raw);
        Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes())
    }

    /// Records that a legacy value was read as its current equivalent.
    pub fn relabel(&mut self, column: &str, from: &str, to: &str) -> String {
        if from != to {
            self.notes.relabeled_values += 1;
            debug!(table = self.table, line = self.line, column, from, to, "legacy value relabeled");
        }
        to.to_string()
    }

    pub fn into_notes(self) -> RowNotes {
        self.notes
    }

    fn cell(&self, column: &str) -> &'a str {
        self.cells.get(column).copied().unwrap_or("")
    }

    fn note(&mut self, message: String) {
        self.notes
            .warnings
            .push(format!("{} line {}: {}", self.table, self.line, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: TableSchema = TableSchema {
        name: "sample",
        file_name: "sample.csv",
        columns: &[
            Column::text("Date").aliased(&["Data"]),
            Column::numeric("Amount").aliased(&["Valor"]),
            Column::text("Note"),
        ],
    };

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn heal_adds_missing_numeric_column_with_zero() {
        let healed = heal(
            &SAMPLE,
            strings(&["Date", "Note"]),
            vec![strings(&["2024-01-01", "cement"]), strings(&["2024-01-02", "sand"])],
        );
        assert_eq!(healed.headers, strings(&["Date", "Note", "Amount"]));
        assert_eq!(healed.records[0], strings(&["2024-01-01", "cement", "0"]));
        assert_eq!(healed.records[1], strings(&["2024-01-02", "sand", "0"]));
        assert_eq!(healed.migration.added_columns, strings(&["Amount"]));
    }

    #[test]
    fn heal_maps_legacy_headers_without_touching_values() {
        let healed = heal(
            &SAMPLE,
            strings(&["Data", "Valor", "Note", "Tipo"]),
            vec![strings(&["2024-01-01", "-50", "fuel", "Despesa"])],
        );
        assert_eq!(healed.headers, strings(&["Date", "Amount", "Note", "Tipo"]));
        assert_eq!(healed.records[0], strings(&["2024-01-01", "-50", "fuel", "Despesa"]));
        assert_eq!(healed.unknown_columns, strings(&["Tipo"]));
        assert!(healed.migration.added_columns.is_empty());
        assert_eq!(healed.migration.renamed_columns.len(), 2);
    }

    #[test]
    fn heal_of_complete_table_is_a_no_op() {
        let healed = heal(&SAMPLE, strings(&["Date", "Amount", "Note"]), vec![]);
        assert!(healed.migration.is_empty());
    }

    #[test]
    fn row_reader_coerces_bad_numbers_to_zero_with_a_note() {
        let headers = strings(&["Date", "Amount"]);
        let values = strings(&["2024-01-01", "abc"]);
        let mut row = RowReader::new(&SAMPLE, 2, &headers, &values);
        assert_eq!(row.decimal("Amount"), Decimal::ZERO);
        let notes = row.into_notes().warnings;
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("line 2"), "{}", notes[0]);
    }

    #[test]
    fn row_reader_refuses_out_of_range_numbers() {
        let headers = strings(&["Date", "Amount"]);
        let values = strings(&["2024-01-01", "79228162514264337593543950335"]);
        let mut row = RowReader::new(&SAMPLE, 4, &headers, &values);
        assert_eq!(row.decimal("Amount"), Decimal::ZERO);
        assert_eq!(row.decimal_up_to("Amount", Decimal::MAX), Decimal::MAX);
        let notes = row.into_notes().warnings;
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("exceeds"), "{}", notes[0]);
    }

    #[test]
    fn derived_ids_are_stable_for_identical_rows() {
        let headers = strings(&["Date", "Amount"]);
        let values = strings(&["2024-01-01", "10"]);
        let first = RowReader::new(&SAMPLE, 2, &headers, &values).id("Id");
        let second = RowReader::new(&SAMPLE, 2, &headers, &values).id("Id");
        let other_line = RowReader::new(&SAMPLE, 3, &headers, &values).id("Id");
        assert_eq!(first, second);
        assert_ne!(first, other_line);
    }
}
