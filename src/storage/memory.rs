use std::sync::RwLock;

use crate::errors::{LedgerError, Result};

use super::{Repository, TableLoad};

/// Volatile repository used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryRepository<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

fn poisoned() -> LedgerError {
    LedgerError::Storage("in-memory table lock poisoned".into())
}

impl<T: Clone + Send + Sync> Repository<T> for MemoryRepository<T> {
    fn load(&self) -> Result<TableLoad<T>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(TableLoad::clean(rows.clone()))
    }

    fn replace_all(&self, rows: &[T]) -> Result<()> {
        let mut guard = self.rows.write().map_err(|_| poisoned())?;
        *guard = rows.to_vec();
        Ok(())
    }

    fn append(&self, row: &T) -> Result<()> {
        let mut guard = self.rows.write().map_err(|_| poisoned())?;
        guard.push(row.clone());
        Ok(())
    }
}
