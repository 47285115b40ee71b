//! Persistence for the ledger's collections.
//!
//! Each collection is a flat table that is read and written whole. Writers are not
//! coordinated: two processes rewriting the same table race and the last write wins.
//! The store assumes a single operator working in a single session.

pub mod csv_table;
pub mod memory;
pub mod records;
pub mod schema;

use uuid::Uuid;

use crate::errors::Result;

pub use csv_table::CsvTable;
pub use memory::MemoryRepository;
pub use schema::{Column, ColumnKind, RowReader, SchemaMigration, TableSchema};

/// A record type that maps onto one row of a persisted table.
pub trait TableRecord: Clone + Send + Sync + 'static {
    fn schema() -> &'static TableSchema;

    /// Builds a record from a healed row. Never fails; unreadable cells are coerced.
    fn from_row(row: &mut RowReader<'_>) -> Self;

    /// Cell values in [`TableSchema::columns`] order.
    fn to_row(&self) -> Vec<String>;

    /// Key that ties a record back to its stored row across rewrites.
    fn row_id(&self) -> Option<Uuid> {
        None
    }
}

/// Outcome of loading one table.
#[derive(Debug, Clone)]
pub struct TableLoad<T> {
    pub rows: Vec<T>,
    pub migration: Option<SchemaMigration>,
    pub warnings: Vec<String>,
    /// Set when the stored table was unreadable and an empty one was recreated.
    pub recovered: bool,
}

impl<T> TableLoad<T> {
    pub fn clean(rows: Vec<T>) -> Self {
        Self {
            rows,
            migration: None,
            warnings: Vec::new(),
            recovered: false,
        }
    }
}

/// Load-everything / rewrite-everything access to one collection.
pub trait Repository<T: Clone>: Send + Sync {
    fn load(&self) -> Result<TableLoad<T>>;

    fn replace_all(&self, rows: &[T]) -> Result<()>;

    fn load_all(&self) -> Result<Vec<T>> {
        Ok(self.load()?.rows)
    }

    fn append(&self, row: &T) -> Result<()> {
        let mut rows = self.load_all()?;
        rows.push(row.clone());
        self.replace_all(&rows)
    }
}
