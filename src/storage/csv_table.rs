use std::{
    collections::HashMap,
    fs,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::RwLock,
};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    core::utils::ensure_dir,
    errors::{LedgerError, Result},
};

use super::{
    schema::{heal, RowReader},
    Repository, TableLoad, TableRecord,
};

const TMP_SUFFIX: &str = "tmp";
const CORRUPT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

type RawTable = (Vec<String>, Vec<Vec<String>>);

/// Stored columns the schema does not know, carried through rewrites after the
/// known ones. Cells are matched back to rows by id.
#[derive(Debug, Default)]
struct ExtraColumns {
    headers: Vec<String>,
    cells: HashMap<Uuid, Vec<String>>,
}

/// Delimited-text table holding one collection, header row first.
pub struct CsvTable<T> {
    path: PathBuf,
    delimiter: u8,
    rewrite_healed: bool,
    extras: RwLock<ExtraColumns>,
    _record: PhantomData<fn() -> T>,
}

fn poisoned() -> LedgerError {
    LedgerError::Storage("extra column cache lock poisoned".into())
}

impl<T: TableRecord> CsvTable<T> {
    /// Table stored under `dir` with the schema's file name.
    pub fn in_dir(dir: &Path, delimiter: u8, rewrite_healed: bool) -> Self {
        Self::at_path(dir.join(T::schema().file_name), delimiter, rewrite_healed)
    }

    pub fn at_path(path: PathBuf, delimiter: u8, rewrite_healed: bool) -> Self {
        Self {
            path,
            delimiter,
            rewrite_healed,
            extras: RwLock::new(ExtraColumns::default()),
            _record: PhantomData,
        }
    }

    fn read_raw(&self) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&self.path)?;
        let headers = reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_string())
            .collect::<Vec<_>>();
        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(str::to_string).collect());
        }
        Ok((headers, records))
    }

    fn write_rows(&self, rows: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let extras = self.extras.read().map_err(|_| poisoned())?;
        let tmp = tmp_path(&self.path);
        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(self.delimiter)
                .from_path(&tmp)?;
            let mut header: Vec<String> =
                T::schema().header().into_iter().map(str::to_string).collect();
            header.extend(extras.headers.iter().cloned());
            writer.write_record(&header)?;
            for row in rows {
                let mut cells = row.to_row();
                if !extras.headers.is_empty() {
                    let carried = row.row_id().and_then(|id| extras.cells.get(&id));
                    match carried {
                        Some(values) => cells.extend(values.iter().cloned()),
                        None => cells.resize(header.len(), String::new()),
                    }
                }
                writer.write_record(&cells)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn recover(&self, err: LedgerError) -> Result<TableLoad<T>> {
        let schema = T::schema();
        let copy = corrupt_copy_path(&self.path);
        fs::copy(&self.path, &copy)?;
        warn!(
            table = schema.name,
            error = %err,
            copy = %copy.display(),
            "table unreadable, recreating it empty"
        );
        self.forget_extras()?;
        self.write_rows(&[])?;
        Ok(TableLoad {
            rows: Vec::new(),
            migration: None,
            warnings: vec![format!(
                "{} was unreadable ({err}); kept a copy at {} and started an empty table",
                self.path.display(),
                copy.display()
            )],
            recovered: true,
        })
    }
}

impl<T: TableRecord> CsvTable<T> {
    fn forget_extras(&self) -> Result<()> {
        *self.extras.write().map_err(|_| poisoned())? = ExtraColumns::default();
        Ok(())
    }
}

impl<T: TableRecord> Repository<T> for CsvTable<T> {
    fn load(&self) -> Result<TableLoad<T>> {
        let schema = T::schema();
        if !self.path.exists() {
            debug!(table = schema.name, path = %self.path.display(), "creating empty table");
            self.forget_extras()?;
            self.write_rows(&[])?;
            return Ok(TableLoad::clean(Vec::new()));
        }

        let (headers, records) = match self.read_raw() {
            Ok(raw) => raw,
            Err(err) => return self.recover(err),
        };
        if headers.is_empty() && records.is_empty() {
            self.forget_extras()?;
            self.write_rows(&[])?;
            return Ok(TableLoad::clean(Vec::new()));
        }

        let healed = heal(schema, headers, records);
        if !healed.unknown_columns.is_empty() {
            warn!(
                table = schema.name,
                columns = ?healed.unknown_columns,
                "keeping columns outside the table schema as they are"
            );
        }
        let extra_indices: Vec<usize> = healed
            .headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !schema.columns.iter().any(|column| column.name == header.as_str()))
            .map(|(index, _)| index)
            .collect();
        let mut extras = ExtraColumns {
            headers: extra_indices
                .iter()
                .map(|&index| healed.headers[index].clone())
                .collect(),
            cells: HashMap::new(),
        };

        let mut migration = healed.migration;
        let mut warnings = Vec::new();
        let mut rows = Vec::with_capacity(healed.records.len());
        for (index, values) in healed.records.iter().enumerate() {
            // Line 1 is the header.
            let mut reader = RowReader::new(schema, index + 2, &healed.headers, values);
            let row = T::from_row(&mut reader);
            if let Some(id) = row.row_id().filter(|_| !extra_indices.is_empty()) {
                let carried = extra_indices.iter().map(|&index| values[index].clone()).collect();
                extras.cells.insert(id, carried);
            }
            rows.push(row);
            let notes = reader.into_notes();
            migration.assigned_ids += notes.assigned_ids;
            migration.relabeled_values += notes.relabeled_values;
            warnings.extend(notes.warnings);
        }
        *self.extras.write().map_err(|_| poisoned())? = extras;
        for note in &warnings {
            warn!(table = schema.name, "{note}");
        }

        let migration = if migration.is_empty() {
            None
        } else {
            if self.rewrite_healed {
                self.write_rows(&rows)?;
                migration.rewritten = true;
            }
            info!(
                table = schema.name,
                rewritten = migration.rewritten,
                "schema migration: {}",
                migration.describe()
            );
            Some(migration)
        };

        debug!(table = schema.name, rows = rows.len(), "table loaded");
        Ok(TableLoad {
            rows,
            migration,
            warnings,
            recovered: false,
        })
    }

    fn replace_all(&self, rows: &[T]) -> Result<()> {
        debug!(table = T::schema().name, rows = rows.len(), "rewriting table");
        self.write_rows(rows)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn corrupt_copy_path(path: &Path) -> PathBuf {
    let stamp = Utc::now().format(CORRUPT_TIMESTAMP_FORMAT);
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("table");
    path.with_file_name(format!("{name}.corrupt-{stamp}"))
}
