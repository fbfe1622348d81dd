//! Flat-file loader: reads one CSV fully into memory and replaces the
//! like-named table with its contents.

use super::batch::{batch_inserts, replace_table_sql, SqlValue, MAX_ROWS_PER_BATCH};
use super::types::{ColumnType, TypeInference};
use crate::error::{LoadError, LoadResult};
use ahash::{AHashMap, AHashSet};
use csv::{ErrorKind, StringRecord};
use duckdb::Connection;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Statistics from loading one file
#[derive(Debug, Clone)]
pub struct LoadStats {
    pub table: String,
    pub file: PathBuf,
    pub rows: u64,
    /// Inferred layout of the created table
    pub columns: Vec<(String, ColumnType)>,
    pub duration_secs: f64,
}

impl std::fmt::Display for LoadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows into {} ({} columns) in {:.2}s",
            self.rows,
            self.table,
            self.columns.len(),
            self.duration_secs
        )
    }
}

/// A flat file parsed into memory, not yet typed
#[derive(Debug, Clone)]
pub struct RawTable {
    pub columns: Vec<String>,
    /// (line number, record) in file order
    pub records: Vec<(u64, StringRecord)>,
}

impl RawTable {
    /// Read and structurally check a CSV file.
    ///
    /// Fails with [`LoadError::MissingInputFile`] if the file is absent and
    /// [`LoadError::MalformedRow`] on a missing or blank header, a row
    /// whose field count differs from the header's, or invalid UTF-8.
    pub fn read(path: &Path) -> LoadResult<Self> {
        if !path.is_file() {
            return Err(LoadError::MissingInputFile {
                file: path.to_path_buf(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        let header = reader.headers().map_err(|e| csv_error(path, e))?.clone();
        let columns: Vec<String> = header.iter().map(|c| c.trim().to_string()).collect();
        if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
            return Err(malformed(path, 1, "missing header row"));
        }
        if let Some(blank) = columns.iter().position(|c| c.is_empty()) {
            return Err(malformed(
                path,
                1,
                format!("column {} has an empty name", blank + 1),
            ));
        }
        let mut seen = AHashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(malformed(path, 1, format!("duplicate column {}", column)));
            }
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| csv_error(path, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            records.push((line, record));
        }

        Ok(Self { columns, records })
    }

    /// Infer one type per column over all rows
    pub fn infer_types(&self) -> Vec<ColumnType> {
        let mut inference = vec![TypeInference::new(); self.columns.len()];
        for (_, record) in &self.records {
            for (state, cell) in inference.iter_mut().zip(record.iter()) {
                state.observe(cell);
            }
        }
        inference.iter().map(TypeInference::resolve).collect()
    }

    /// Whether the first column is the table's key (`*_id`)
    pub fn has_key_column(&self) -> bool {
        self.columns
            .first()
            .map(|c| c.ends_with("_id"))
            .unwrap_or(false)
    }

    /// Reject empty or duplicate values in the key column.
    ///
    /// Keys are compared as the values the store will hold, so `1` and
    /// `01` collide in a BIGINT key.
    pub fn check_unique_key(&self, path: &Path, key_type: ColumnType) -> LoadResult<()> {
        if !self.has_key_column() {
            return Ok(());
        }
        let column = &self.columns[0];
        let mut seen: AHashMap<String, u64> = AHashMap::with_capacity(self.records.len());
        for (line, record) in &self.records {
            let cell = record.get(0).unwrap_or("");
            let key = SqlValue::from_cell(cell, key_type);
            if key == SqlValue::Null {
                return Err(malformed(path, *line, format!("empty key in column {column}")));
            }
            if seen.insert(key.to_sql(), *line).is_some() {
                return Err(LoadError::DuplicateKeyViolation {
                    file: path.to_path_buf(),
                    column: column.clone(),
                    value: cell.trim().to_string(),
                    line: *line,
                });
            }
        }
        Ok(())
    }

    /// Convert every cell to a typed value
    pub fn typed_rows(&self, types: &[ColumnType]) -> Vec<Vec<SqlValue>> {
        self.records
            .iter()
            .map(|(_, record)| {
                record
                    .iter()
                    .zip(types)
                    .map(|(cell, ty)| SqlValue::from_cell(cell, *ty))
                    .collect()
            })
            .collect()
    }
}

/// Loads flat files into a DuckDB connection
pub struct CsvLoader<'a> {
    conn: &'a mut Connection,
    batch_size: usize,
}

impl<'a> CsvLoader<'a> {
    pub fn new(conn: &'a mut Connection) -> Self {
        Self {
            conn,
            batch_size: MAX_ROWS_PER_BATCH,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Replace `table` with the contents of the CSV at `path`.
    ///
    /// The file is parsed and checked fully before the store is touched,
    /// and the drop, create and inserts run in one transaction, so a
    /// failure leaves the previous table (if any) unchanged.
    pub fn load(&mut self, path: &Path, table: &str) -> LoadResult<LoadStats> {
        let start = Instant::now();

        let raw = RawTable::read(path)?;
        let types = raw.infer_types();
        if let Some(key_type) = types.first() {
            raw.check_unique_key(path, *key_type)?;
        }
        let rows = raw.typed_rows(&types);

        debug!(
            table,
            file = %path.display(),
            rows = rows.len(),
            "parsed flat file"
        );

        let store_err = |source: duckdb::Error| LoadError::Store {
            file: path.to_path_buf(),
            table: table.to_string(),
            source,
        };

        let tx = self.conn.transaction().map_err(store_err)?;
        tx.execute_batch(&replace_table_sql(
            table,
            &raw.columns,
            &types,
            raw.has_key_column(),
        ))
        .map_err(store_err)?;
        for insert in batch_inserts(table, &raw.columns, &rows, self.batch_size) {
            tx.execute_batch(&insert).map_err(store_err)?;
        }
        tx.commit().map_err(store_err)?;

        Ok(LoadStats {
            table: table.to_string(),
            file: path.to_path_buf(),
            rows: rows.len() as u64,
            columns: raw.columns.into_iter().zip(types).collect(),
            duration_secs: start.elapsed().as_secs_f64(),
        })
    }
}

fn malformed(path: &Path, line: u64, reason: impl Into<String>) -> LoadError {
    LoadError::MalformedRow {
        file: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

/// Map a csv error onto the load error kinds
fn csv_error(path: &Path, err: csv::Error) -> LoadError {
    match err.into_kind() {
        ErrorKind::Io(source) => LoadError::Io {
            file: path.to_path_buf(),
            source,
        },
        ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => malformed(
            path,
            pos.map(|p| p.line()).unwrap_or(0),
            format!("expected {} fields, found {}", expected_len, len),
        ),
        ErrorKind::Utf8 { pos, err } => malformed(
            path,
            pos.map(|p| p.line()).unwrap_or(0),
            format!("invalid UTF-8: {}", err),
        ),
        other => malformed(path, 0, format!("{:?}", other)),
    }
}
